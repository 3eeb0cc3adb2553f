// src/ingest/decode/json.rs
//! JSON Feed (and look-alike) documents: an object with `items` or `entries`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::dates::{from_epoch_f64, parse_timestamp};
use super::{Candidate, DecodeError, DecodeOutcome};
use crate::ingest::{non_empty, normalize_link, normalize_text};

const LINK_KEYS: &[&str] = &["url", "link", "external_url"];
const DATE_KEYS: &[&str] = &["date_published", "published", "date", "updated", "date_modified"];
const DESCRIPTION_KEYS: &[&str] = &["summary", "content_text", "content_html", "description"];
const IMAGE_KEYS: &[&str] = &["image", "banner_image", "thumbnail"];

fn str_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn first_text(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| str_field(obj, k))
        .map(|s| normalize_text(&s))
        .find_map(non_empty)
}

fn first_link(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| str_field(obj, k))
        .map(|s| normalize_link(&s))
        .find_map(non_empty)
}

/// Dates may be strings or epoch numbers.
fn first_date(obj: &Value) -> Option<DateTime<Utc>> {
    DATE_KEYS.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_f64().and_then(from_epoch_f64),
        _ => None,
    })
}

/// `author.name`, then a bare `author` string, then `authors[0].name`.
fn byline(obj: &Value) -> Option<String> {
    let author = obj.get("author");
    let from_object = author.and_then(|a| a.get("name")).and_then(Value::as_str);
    let from_string = author.and_then(Value::as_str);
    let from_list = obj
        .get("authors")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(|a| a.get("name"))
        .and_then(Value::as_str);

    [from_object, from_string, from_list]
        .into_iter()
        .flatten()
        .map(normalize_text)
        .find_map(non_empty)
}

pub(crate) fn candidate(obj: &Value) -> Candidate {
    Candidate {
        title: first_text(obj, &["title"]),
        link: first_link(obj, LINK_KEYS),
        description: first_text(obj, DESCRIPTION_KEYS),
        published: first_date(obj),
        image: first_link(obj, IMAGE_KEYS),
        byline: byline(obj),
    }
}

pub fn decode(doc: &str, label: &str) -> Result<DecodeOutcome, DecodeError> {
    let root: Value = serde_json::from_str(doc).map_err(|e| DecodeError::Json(e.to_string()))?;
    let list = root
        .get("items")
        .and_then(Value::as_array)
        .or_else(|| root.get("entries").and_then(Value::as_array))
        .ok_or(DecodeError::NoJsonItems)?;

    let mut out = DecodeOutcome::default();
    for obj in list {
        out.push(candidate(obj).into_item(label), label);
    }
    Ok(out)
}
