// src/ingest/decode/rss.rs
use super::dates::parse_timestamp;
use super::markup::item_blocks;
use super::{first_match, image_attr_of, link_text_of, text_of, Candidate, DecodeOutcome, Extractor};

const TITLE: &[Extractor] = &[title];
const LINK: &[Extractor] = &[link, guid];
const DESCRIPTION: &[Extractor] = &[description, content_encoded, content, summary];
const PUBLISHED: &[Extractor] = &[pub_date, published, dc_date, updated];
const BYLINE: &[Extractor] = &[dc_creator, author];
const IMAGE: &[Extractor] = &[enclosure, media_content, media_thumbnail];

fn title(b: &str) -> Option<String> {
    text_of(b, "title")
}
fn link(b: &str) -> Option<String> {
    link_text_of(b, "link")
}
fn guid(b: &str) -> Option<String> {
    link_text_of(b, "guid")
}
fn description(b: &str) -> Option<String> {
    text_of(b, "description")
}
fn content_encoded(b: &str) -> Option<String> {
    text_of(b, "content:encoded")
}
fn content(b: &str) -> Option<String> {
    text_of(b, "content")
}
fn summary(b: &str) -> Option<String> {
    text_of(b, "summary")
}
fn pub_date(b: &str) -> Option<String> {
    text_of(b, "pubDate")
}
fn published(b: &str) -> Option<String> {
    text_of(b, "published")
}
fn dc_date(b: &str) -> Option<String> {
    text_of(b, "dc:date")
}
fn updated(b: &str) -> Option<String> {
    text_of(b, "updated")
}
fn dc_creator(b: &str) -> Option<String> {
    text_of(b, "dc:creator")
}
fn author(b: &str) -> Option<String> {
    text_of(b, "author")
}
fn enclosure(b: &str) -> Option<String> {
    image_attr_of(b, "enclosure", "url")
}
fn media_content(b: &str) -> Option<String> {
    image_attr_of(b, "media:content", "url")
}
fn media_thumbnail(b: &str) -> Option<String> {
    image_attr_of(b, "media:thumbnail", "url")
}

/// Fields of one `<item>` block.
pub(crate) fn candidate(block: &str) -> Candidate {
    // An unparseable pubDate must not shadow a usable dc:date further down.
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
    for block in item_blocks(doc) {
        out.push(candidate(block).into_item(label), label);
    }
    out
}
