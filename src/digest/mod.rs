// src/digest/mod.rs
//! Pure selection: dedupe, recency sort, hero pick and rail shaping.

pub mod coordinator;

use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ingest::types::{iso_millis, iso_millis_required, NewsItem};

pub const DEFAULT_MAX_ITEMS: usize = 22;

/// Secondary headline: a projection of [`NewsItem`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RailItem {
    pub title: Option<String>,
    pub link: String,
    pub source: String,
    #[serde(rename = "isoDate", with = "iso_millis", default)]
    pub iso_date: Option<DateTime<Utc>>,
}

impl From<&NewsItem> for RailItem {
    fn from(item: &NewsItem) -> Self {
        Self {
            title: item.title.clone(),
            link: item.link.clone(),
            source: item.source.clone(),
            iso_date: item.iso_date,
        }
    }
}

/// Result of one recomputation. Replaced wholesale, never patched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Digest {
    pub hero: Option<NewsItem>,
    pub rail: Vec<RailItem>,
    /// Distinct items before rail truncation.
    pub count: usize,
    pub version: String,
    #[serde(rename = "ts", with = "iso_millis_required")]
    pub generated_at: DateTime<Utc>,
}

impl Digest {
    pub fn empty(version: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            hero: None,
            rail: Vec::new(),
            count: 0,
            version: version.into(),
            generated_at: now,
        }
    }
}

/// Trimmed link, or trimmed title when the link is blank.
fn dedupe_key(item: &NewsItem) -> Option<String> {
    let link = item.link.trim();
    if !link.is_empty() {
        return Some(link.to_string());
    }
    item.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// First occurrence per key wins; keyless items are dropped.
pub fn dedupe(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|it| match dedupe_key(it) {
            Some(k) => seen.insert(k),
            None => false,
        })
        .collect()
}

/// Newest first. Stable, so equal timestamps keep their incoming order.
pub fn sort_by_recency(items: &mut [NewsItem]) {
    items.sort_by_key(|it| Reverse(it.timestamp_millis()));
}

/// Absolute `http(s)` URL with a host.
pub fn is_absolute_image(raw: &str) -> bool {
    match Url::parse(raw.trim()) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// First item with a usable image, else the first item.
pub fn choose_hero(sorted: &[NewsItem]) -> Option<&NewsItem> {
    sorted
        .iter()
        .find(|it| it.image.as_deref().is_some_and(is_absolute_image))
        .or_else(|| sorted.first())
}

/// Everything but the hero's link, capped at `max_items`.
pub fn build_rail(sorted: &[NewsItem], hero: Option<&NewsItem>, max_items: usize) -> Vec<RailItem> {
    let hero_link = hero.map(|h| h.link.as_str());
    sorted
        .iter()
        .filter(|it| Some(it.link.as_str()) != hero_link)
        .take(max_items)
        .map(RailItem::from)
        .collect()
}

/// Merged items from every source → digest.
pub fn assemble_digest(
    items: Vec<NewsItem>,
    version: &str,
    max_items: usize,
    now: DateTime<Utc>,
) -> Digest {
    let mut items = dedupe(items);
    sort_by_recency(&mut items);

    let hero = choose_hero(&items);
    let rail = build_rail(&items, hero, max_items);

    Digest {
        hero: hero.cloned(),
        rail,
        count: items.len(),
        version: version.to_string(),
        generated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(link: &str, title: &str, secs: Option<i64>, image: Option<&str>) -> NewsItem {
        NewsItem {
            title: Some(title.to_string()),
            link: link.to_string(),
            source: "T".into(),
            iso_date: secs.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            description: String::new(),
            image: image.map(str::to_string),
            byline: None,
        }
    }

    #[test]
    fn dedupe_keeps_first_and_falls_back_to_title() {
        let items = vec![
            item(" https://e.com/a ", "first", Some(1), None),
            item("https://e.com/a", "second", Some(2), None),
            item("", "Same title", None, None),
            item("  ", " Same title ", None, None),
            item("", "", None, None),
        ];
        let out = dedupe(items);
        let titles: Vec<_> = out.iter().map(|i| i.title.as_deref().unwrap()).collect();
        assert_eq!(titles, vec!["first", "Same title"]);
    }

    #[test]
    fn tracking_params_are_distinct() {
        let items = vec![
            item("https://e.com/a?utm_source=rss", "x", None, None),
            item("https://e.com/a", "x", None, None),
        ];
        assert_eq!(dedupe(items).len(), 2);
    }

    #[test]
    fn sort_is_stable_and_missing_dates_go_last() {
        let mut items = vec![
            item("a", "a", None, None),
            item("b", "b", Some(100), None),
            item("c", "c", Some(200), None),
            item("d", "d", Some(100), None),
        ];
        sort_by_recency(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn hero_needs_absolute_http_image() {
        let items = vec![
            item("a", "a", Some(3), Some("/relative.jpg")),
            item("b", "b", Some(2), Some("ftp://e.com/x.jpg")),
            item("c", "c", Some(1), Some("https://img.e.com/c.jpg")),
        ];
        assert_eq!(choose_hero(&items).map(|h| h.link.as_str()), Some("c"));

        let no_images = vec![item("a", "a", None, None), item("b", "b", None, None)];
        assert_eq!(choose_hero(&no_images).map(|h| h.link.as_str()), Some("a"));
        assert!(choose_hero(&[]).is_none());
    }

    #[test]
    fn absolute_image_check() {
        assert!(is_absolute_image("https://e.com/x.png"));
        assert!(is_absolute_image(" http://e.com/x.png "));
        assert!(!is_absolute_image("//e.com/x.png"));
        assert!(!is_absolute_image("data:image/png;base64,AAAA"));
        assert!(!is_absolute_image("file:///tmp/x.png"));
    }

    #[test]
    fn rail_excludes_hero_and_is_capped() {
        let items: Vec<_> = (0..30)
            .map(|i| item(&format!("https://e.com/{i}"), "t", Some(1000 - i), None))
            .collect();
        let digest = assemble_digest(items, "v1", 22, Utc.timestamp_opt(0, 0).unwrap());
        let hero = digest.hero.as_ref().unwrap();
        assert_eq!(hero.link, "https://e.com/0");
        assert_eq!(digest.rail.len(), 22);
        assert!(digest.rail.iter().all(|r| r.link != hero.link));
        assert_eq!(digest.count, 30);
    }

    #[test]
    fn empty_input_gives_empty_digest() {
        let now = Utc.timestamp_opt(1_751_371_200, 0).unwrap();
        let digest = assemble_digest(Vec::new(), "v1", 22, now);
        assert_eq!(digest, Digest::empty("v1", now));

        let v = serde_json::to_value(&digest).unwrap();
        assert!(v["hero"].is_null());
        assert_eq!(v["rail"], serde_json::json!([]));
        assert_eq!(v["ts"], "2025-07-01T12:00:00.000Z");
    }
}
