// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One configured feed endpoint plus the label shown next to its headlines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    pub label: String,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

/// Unparsed body of one fetch. Handed once to the decoder and dropped there.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub source: FeedSource,
    pub body: String,
    /// Lowercased `content-type` header, if the server sent one.
    pub content_type: Option<String>,
}

impl RawDocument {
    pub fn new(source: FeedSource, body: impl Into<String>) -> Self {
        Self {
            source,
            body: body.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into().to_ascii_lowercase());
        self
    }
}

/// Canonical news item shared by every feed format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: String,
    pub source: String, // feed label, e.g. "WCPO"
    #[serde(rename = "isoDate", with = "iso_millis", default)]
    pub iso_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    pub byline: Option<String>,
}

impl NewsItem {
    /// Sort key: epoch milliseconds, missing timestamps count as the epoch itself.
    pub fn timestamp_millis(&self) -> i64 {
        self.iso_date.map(|d| d.timestamp_millis()).unwrap_or(0)
    }
}

/// Serde helper: `Option<DateTime<Utc>>` as `2025-07-01T12:00:00.000Z` or `null`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(v: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(dt) => s.serialize_str(&format(dt)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Same as [`iso_millis`] for a required timestamp.
pub mod iso_millis_required {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::iso_millis::format(v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn iso_date_serializes_with_millis_and_z() {
        let item = NewsItem {
            title: Some("Hello".into()),
            link: "https://example.com/a".into(),
            source: "WCPO".into(),
            iso_date: Some(Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()),
            description: String::new(),
            image: None,
            byline: None,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["isoDate"], "2025-07-01T12:00:00.000Z");
        assert!(v["image"].is_null());

        let back: NewsItem = serde_json::from_value(v).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn missing_timestamp_sorts_as_epoch() {
        let item = NewsItem {
            title: Some("x".into()),
            link: "l".into(),
            source: "s".into(),
            iso_date: None,
            description: String::new(),
            image: None,
            byline: None,
        };
        assert_eq!(item.timestamp_millis(), 0);
        assert!(serde_json::to_value(&item).unwrap()["isoDate"].is_null());
    }
}
