// src/ingest/mod.rs
pub mod decode;
pub mod fetch;
pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length (in chars) of a normalized description.
pub const DESCRIPTION_MAX_CHARS: usize = 1500;

static RE_CDATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)</?[A-Za-z!][^>]*>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Unwrap every `<![CDATA[ ... ]]>` section, keeping its content verbatim.
pub fn strip_cdata(s: &str) -> String {
    if !s.contains("<![CDATA[") {
        return s.to_string();
    }
    RE_CDATA.replace_all(s, "$1").into_owned()
}

/// Normalize descriptive text pulled out of markup.
///
/// 1) unwrap CDATA
/// 2) decode character escapes (`&amp;`, `&#8217;`, `&nbsp;`, ...)
/// 3) replace embedded tags with a space
/// 4) collapse whitespace runs, trim
pub fn normalize_text(s: &str) -> String {
    let unwrapped = strip_cdata(s);
    let decoded = html_escape::decode_html_entities(&unwrapped);
    let untagged = RE_TAGS.replace_all(&decoded, " ");
    let collapsed = RE_WS.replace_all(&untagged, " ");
    collapsed.trim().to_string()
}

/// Normalize a URL-ish value: unwrap CDATA, decode escapes, trim. No tag stripping.
pub fn normalize_link(s: &str) -> String {
    let unwrapped = strip_cdata(s);
    html_escape::decode_html_entities(unwrapped.trim())
        .trim()
        .to_string()
}

/// Char-boundary safe length cap.
pub fn truncate_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s,
    }
}

/// `Some(s)` when the string is non-empty after trimming.
pub(crate) fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_tags_and_collapses_ws() {
        let s = "  <p>Hello,&nbsp;&nbsp; <b>world</b></p>\n\t ";
        assert_eq!(normalize_text(s), "Hello, world");
    }

    #[test]
    fn normalize_text_unwraps_cdata_and_escaped_markup() {
        let s = "<![CDATA[<p>Council &amp; mayor</p>]]>";
        assert_eq!(normalize_text(s), "Council & mayor");

        let escaped = "&lt;p&gt;Escaped &lt;em&gt;html&lt;/em&gt;&lt;/p&gt;";
        assert_eq!(normalize_text(escaped), "Escaped html");
    }

    #[test]
    fn normalize_text_keeps_plain_comparisons() {
        assert_eq!(normalize_text("3 &lt; 4 and 5 > 2"), "3 < 4 and 5 > 2");
    }

    #[test]
    fn normalize_link_decodes_query_ampersands() {
        let s = " <![CDATA[https://example.com/a?x=1&amp;y=2]]> ";
        assert_eq!(normalize_link(s), "https://example.com/a?x=1&y=2");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(10);
        assert_eq!(truncate_chars(s, 3), "ééé");
        assert_eq!(truncate_chars("short".into(), 10), "short");
    }
}
