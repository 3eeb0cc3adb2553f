// src/ingest/decode/markup.rs
//! Regex matchers for feed markup. Tolerates unescaped ampersands, stray tags
//! and truncated bodies; one bad block never rejects the document.
//!
//! Precedence is block first, then field: a document is split into
//! `<item>`/`<entry>` blocks, and field matchers only ever see one block.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Tags whose *text content* we read.
const TEXT_TAGS: &[&str] = &[
    "title",
    "link",
    "guid",
    "id",
    "description",
    "content:encoded",
    "content",
    "summary",
    "pubDate",
    "published",
    "dc:date",
    "updated",
    "dc:creator",
    "author",
    "name",
];

/// Tags whose *attributes* we read (usually self-closing).
const ATTR_TAGS: &[&str] = &["link", "enclosure", "media:content", "media:thumbnail"];

static RE_ITEM_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<item(?:\s[^>]*)?>(.*?)</item\s*>").unwrap());
static RE_ENTRY_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<entry(?:\s[^>]*)?>(.*?)</entry\s*>").unwrap());

static RE_HAS_CHANNEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<channel[\s>]").unwrap());
static RE_HAS_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<item[\s>]").unwrap());
static RE_HAS_FEED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<feed[\s>]").unwrap());
static RE_HAS_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<entry[\s>]").unwrap());

static RE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)([A-Za-z_][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// `<tag ...>text</tag>`; `(?:\s[^>]*)?` keeps `<title>` from matching `<titleFoo>`.
static TEXT_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    TEXT_TAGS
        .iter()
        .map(|tag| {
            let t = regex::escape(tag);
            let re = Regex::new(&format!(r"(?is)<{t}(?:\s[^>]*)?>(.*?)</{t}\s*>")).unwrap();
            (*tag, re)
        })
        .collect()
});

/// `<tag attrs>` or `<tag attrs/>`; captures the raw attribute string.
static ATTR_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    ATTR_TAGS
        .iter()
        .map(|tag| {
            let t = regex::escape(tag);
            let re = Regex::new(&format!(r"(?is)<{t}(\s[^>]*?)?/?>")).unwrap();
            (*tag, re)
        })
        .collect()
});

/// Channel container with item elements (RSS 0.9x/2.0, RDF).
pub fn looks_like_rss(doc: &str) -> bool {
    RE_HAS_CHANNEL.is_match(doc) && RE_HAS_ITEM.is_match(doc)
}

/// Feed container with entry elements (Atom).
pub fn looks_like_atom(doc: &str) -> bool {
    RE_HAS_FEED.is_match(doc) && RE_HAS_ENTRY.is_match(doc)
}

pub fn item_blocks(doc: &str) -> Vec<&str> {
    collect_blocks(&RE_ITEM_BLOCK, &RE_HAS_ITEM, doc)
}

pub fn entry_blocks(doc: &str) -> Vec<&str> {
    collect_blocks(&RE_ENTRY_BLOCK, &RE_HAS_ENTRY, doc)
}

fn collect_blocks<'a>(block: &Regex, opener: &Regex, doc: &'a str) -> Vec<&'a str> {
    block
        .captures_iter(doc)
        .filter_map(|c| c.get(1).map(|m| innermost(m.as_str(), opener)))
        .collect()
}

/// An unterminated sibling swallows the next block; keep only the text after
/// the last opener so the intact block still parses on its own.
fn innermost<'a>(block: &'a str, opener: &Regex) -> &'a str {
    let Some(last) = opener.find_iter(block).last() else {
        return block;
    };
    match block[last.start()..].find('>') {
        Some(gt) => &block[last.start() + gt + 1..],
        None => block,
    }
}

/// Raw inner text of the first `<tag>` in `block` (not normalized).
pub fn element_text<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let re = TEXT_PATTERNS.get(tag)?;
    re.captures(block).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Attribute maps (lowercased names, raw values) of every `<tag ...>` in `block`.
pub fn element_attrs(block: &str, tag: &str) -> Vec<HashMap<String, String>> {
    let Some(re) = ATTR_PATTERNS.get(tag) else {
        return Vec::new();
    };
    re.captures_iter(block)
        .map(|c| c.get(1).map(|m| parse_attrs(m.as_str())).unwrap_or_default())
        .collect()
}

fn parse_attrs(raw: &str) -> HashMap<String, String> {
    RE_ATTR
        .captures_iter(raw)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_ascii_lowercase();
            let value = c.get(2).or_else(|| c.get(3))?.as_str().to_string();
            Some((name, value))
        })
        .collect()
}
