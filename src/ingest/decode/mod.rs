// src/ingest/decode/mod.rs
//! Decoder: raw feed text → canonical [`NewsItem`]s for one source.
//!
//! Format is sniffed (RSS → Atom → JSON → nothing), the document is split into
//! blocks, and each field is pulled through an ordered chain of extractors
//! where the first non-empty value wins. Decoding never fails as a whole: a bad
//! block is dropped, an unknown document yields no items.

pub mod atom;
pub mod dates;
pub mod json;
pub mod markup;
pub mod rss;

use chrono::{DateTime, Utc};
use metrics::counter;
use thiserror::Error;

use crate::ingest::types::{NewsItem, RawDocument};
use crate::ingest::{normalize_link, normalize_text, non_empty, truncate_chars, DESCRIPTION_MAX_CHARS};

/// Why a block or document produced no item. Recovered inside the decoder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("block has no title")]
    MissingTitle,
    #[error("block has no link")]
    MissingLink,
    #[error("malformed json body: {0}")]
    Json(String),
    #[error("json body has no items or entries array")]
    NoJsonItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Rss,
    Atom,
    Json,
    Unknown,
}

/// Field extractor over one block; `None` passes to the next in the chain.
pub(crate) type Extractor = fn(&str) -> Option<String>;

pub(crate) fn first_match(block: &str, chain: &[Extractor]) -> Option<String> {
    chain.iter().find_map(|extract| extract(block))
}

/// Normalized, non-empty text of `<tag>`.
pub(crate) fn text_of(block: &str, tag: &str) -> Option<String> {
    markup::element_text(block, tag)
        .map(normalize_text)
        .and_then(non_empty)
}

/// URL-ish text of `<tag>` (escapes decoded, no tag stripping).
pub(crate) fn link_text_of(block: &str, tag: &str) -> Option<String> {
    markup::element_text(block, tag)
        .map(normalize_link)
        .and_then(non_empty)
}

/// First `url`-like attribute of `<tag>` that points at an image.
///
/// Entries declaring a non-image `type` (podcast audio, video) or a
/// non-image `medium` are skipped; entries declaring neither are accepted.
pub(crate) fn image_attr_of(block: &str, tag: &str, attr: &str) -> Option<String> {
    markup::element_attrs(block, tag)
        .into_iter()
        .filter(|attrs| {
            let type_ok = attrs
                .get("type")
                .map(|t| t.trim().to_ascii_lowercase().starts_with("image/"))
                .unwrap_or(true);
            let medium_ok = attrs
                .get("medium")
                .map(|m| m.trim().eq_ignore_ascii_case("image"))
                .unwrap_or(true);
            type_ok && medium_ok
        })
        .find_map(|attrs| attrs.get(attr).map(|v| normalize_link(v)).and_then(non_empty))
}

/// Fields pulled from one block before the retention filter.
#[derive(Debug, Default, Clone)]
pub(crate) struct Candidate {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub byline: Option<String>,
}

impl Candidate {
    /// Retention filter: title and link must both be non-empty.
    pub fn into_item(self, label: &str) -> Result<NewsItem, DecodeError> {
        let title = self.title.and_then(non_empty).ok_or(DecodeError::MissingTitle)?;
        let link = self.link.and_then(non_empty).ok_or(DecodeError::MissingLink)?;
        let description = self
            .description
            .map(|d| truncate_chars(d, DESCRIPTION_MAX_CHARS))
            .unwrap_or_default();

        Ok(NewsItem {
            title: Some(title),
            link,
            source: label.to_string(),
            iso_date: self.published,
            description,
            image: self.image,
            byline: self.byline,
        })
    }
}

/// Items kept from one document plus how many candidate blocks were dropped.
#[derive(Debug, Default)]
pub struct DecodeOutcome {
    pub items: Vec<NewsItem>,
    pub dropped: usize,
}

impl DecodeOutcome {
    pub(crate) fn push(&mut self, res: Result<NewsItem, DecodeError>, label: &str) {
        match res {
            Ok(item) => self.items.push(item),
            Err(e) => {
                self.dropped += 1;
                tracing::trace!(target: "ingest", source = label, error = %e, "block dropped");
            }
        }
    }
}

/// Classify a document. JSON needs a hint: a json content-type or an object body.
pub fn sniff(text: &str, content_type: Option<&str>) -> FeedFormat {
    if markup::looks_like_rss(text) {
        return FeedFormat::Rss;
    }
    if markup::looks_like_atom(text) {
        return FeedFormat::Atom;
    }
    let json_header = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);
    if json_header || text.trim_start().starts_with('{') {
        return FeedFormat::Json;
    }
    FeedFormat::Unknown
}

/// Decode one fetched document. Consumes it; the raw body is not kept.
pub fn decode_document(doc: RawDocument) -> Vec<NewsItem> {
    decode(&doc.body, &doc.source.label, doc.content_type.as_deref())
}

/// Decode `text` from the source labelled `label`.
pub fn decode(text: &str, label: &str, content_type: Option<&str>) -> Vec<NewsItem> {
    let format = sniff(text, content_type);
    let outcome = match format {
        FeedFormat::Rss => Ok(rss::decode(text, label)),
        FeedFormat::Atom => Ok(atom::decode(text, label)),
        FeedFormat::Json => json::decode(text, label),
        FeedFormat::Unknown => Ok(DecodeOutcome::default()),
    };

    match outcome {
        Ok(DecodeOutcome { items, dropped }) => {
            counter!("news_items_decoded_total").increment(items.len() as u64);
            counter!("news_items_dropped_total").increment(dropped as u64);
            tracing::debug!(
                target: "ingest",
                source = label,
                format = ?format,
                kept = items.len(),
                dropped,
                "decoded feed"
            );
            items
        }
        Err(e) => {
            tracing::debug!(target: "ingest", source = label, format = ?format, error = %e, "document yielded no items");
            Vec::new()
        }
    }
}
