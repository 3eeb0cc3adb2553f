// src/ingest/decode/atom.rs
use std::collections::HashMap;

use super::dates::parse_timestamp;
use super::markup::{element_attrs, element_text, entry_blocks};
use super::{first_match, link_text_of, text_of, Candidate, DecodeOutcome, Extractor};
use crate::ingest::{non_empty, normalize_link, normalize_text};

const TITLE: &[Extractor] = &[title];
const LINK: &[Extractor] = &[alternate_link, plain_link, any_link, link_text];
const DESCRIPTION: &[Extractor] = &[content, summary];
const PUBLISHED: &[Extractor] = &[published, updated];
const BYLINE: &[Extractor] = &[dc_creator, author_name, author_text];
const IMAGE: &[Extractor] = &[enclosure_link, media_content, media_thumbnail];

fn title(b: &str) -> Option<String> {
    text_of(b, "title")
}

fn links(b: &str) -> Vec<HashMap<String, String>> {
    element_attrs(b, "link")
}

fn href(attrs: &HashMap<String, String>) -> Option<String> {
    attrs
        .get("href")
        .map(|h| normalize_link(h))
        .and_then(non_empty)
}

fn rel_is(attrs: &HashMap<String, String>, rel: &str) -> bool {
    attrs
        .get("rel")
        .map(|r| r.trim().eq_ignore_ascii_case(rel))
        .unwrap_or(false)
}

fn alternate_link(b: &str) -> Option<String> {
    links(b).iter().filter(|a| rel_is(a, "alternate")).find_map(href)
}

/// `<link href>` without `rel` means alternate per RFC 4287.
fn plain_link(b: &str) -> Option<String> {
    links(b).iter().filter(|a| !a.contains_key("rel")).find_map(href)
}

fn any_link(b: &str) -> Option<String> {
    links(b)
        .iter()
        .filter(|a| !rel_is(a, "enclosure") && !rel_is(a, "self"))
        .find_map(href)
}

fn link_text(b: &str) -> Option<String> {
    link_text_of(b, "link")
}

fn content(b: &str) -> Option<String> {
    text_of(b, "content")
}
fn summary(b: &str) -> Option<String> {
    text_of(b, "summary")
}
fn published(b: &str) -> Option<String> {
    text_of(b, "published")
}
fn updated(b: &str) -> Option<String> {
    text_of(b, "updated")
}

fn dc_creator(b: &str) -> Option<String> {
    text_of(b, "dc:creator")
}

fn author_name(b: &str) -> Option<String> {
    let author = element_text(b, "author")?;
    element_text(author, "name")
        .map(normalize_text)
        .and_then(non_empty)
}

fn author_text(b: &str) -> Option<String> {
    text_of(b, "author")
}

fn enclosure_link(b: &str) -> Option<String> {
    links(b)
        .iter()
        .filter(|a| rel_is(a, "enclosure"))
        .filter(|a| {
            a.get("type")
                .map(|t| t.trim().to_ascii_lowercase().starts_with("image/"))
                .unwrap_or(true)
        })
        .find_map(href)
}

fn media_content(b: &str) -> Option<String> {
    super::image_attr_of(b, "media:content", "url")
}

fn media_thumbnail(b: &str) -> Option<String> {
    super::image_attr_of(b, "media:thumbnail", "url")
}

/// Fields of one `<entry>` block.
pub(crate) fn candidate(block: &str) -> Candidate {
    let published = PUBLISHED
        .iter()
        .filter_map(|extract| extract(block))
        .find_map(|raw| parse_timestamp(&raw));

    Candidate {
        title: first_match(block, TITLE),
        link: first_match(block, LINK),
        description: first_match(block, DESCRIPTION),
        published,
        image: first_match(block, IMAGE),
        byline: first_match(block, BYLINE),
    }
}

pub fn decode(doc: &str, label: &str) -> DecodeOutcome {
    let mut out = DecodeOutcome::default();
    for block in entry_blocks(doc) {
        out.push(candidate(block).into_item(label), label);
    }
    out
}
