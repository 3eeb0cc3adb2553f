// src/config/feeds.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::FeedSource;

pub const ENV_PATH: &str = "NEWS_FEEDS_PATH";

/// Curated Cincinnati feeds used when no feed file is present.
const SEED: &[(&str, &str)] = &[
    ("https://www.wcpo.com/news/local-news/hamilton-county/cincinnati.rss", "WCPO"),
    ("https://www.wlwt.com/local-news-rss", "WLWT"),
    ("https://www.wvxu.org/politics.rss", "WVXU"),
    ("https://www.citybeat.com/cincinnati/Rss.xml?section=11962257", "CityBeat"),
    ("https://www.cincinnatimagazine.com/category/news/feed/", "Cincinnati Magazine"),
    ("https://thecincinnatiherald.com/feed/", "Cincinnati Herald"),
    ("https://rss.bizjournals.com/cincinnati/latest_news", "Cincy Business Courier"),
];

pub fn default_feeds() -> Vec<FeedSource> {
    SEED.iter().map(|(url, label)| FeedSource::new(*url, *label)).collect()
}

/// Load feeds from an explicit path. Supports TOML (`[[feeds]]`) or a JSON array.
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str()).with_context(|| format!("parsing {}", path.display()))
}

/// Load feeds using env var + fallbacks:
/// 1) $NEWS_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in seed
pub fn load_feeds_default() -> Result<Vec<FeedSource>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("NEWS_FEEDS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feeds_from(&json_p);
    }
    Ok(default_feeds())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<FeedSource>> {
    let try_toml = hint_ext == "toml" || s.contains("[[feeds]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feeds format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedSource>> {
    #[derive(serde::Deserialize)]
    struct TomlFeeds {
        feeds: Vec<FeedSource>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(clean_list(v.feeds))
}

fn parse_json(s: &str) -> Result<Vec<FeedSource>> {
    let v: Vec<FeedSource> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim, drop blanks and repeated URLs. Keeps file order (it is the tie-break order).
fn clean_list(items: Vec<FeedSource>) -> Vec<FeedSource> {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let url = it.url.trim();
        let label = it.label.trim();
        if url.is_empty() || label.is_empty() {
            continue;
        }
        if seen.insert(url.to_string()) {
            out.push(FeedSource::new(url, label));
        }
    }
    out
}
