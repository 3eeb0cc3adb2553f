// src/ingest/decode/dates.rs
//! Timestamp normalization. Every parser is tried in order; the first that
//! understands the value wins. Unknown shapes become `None`, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

/// Numeric epoch values below this are seconds, at or above it milliseconds.
/// 2e10 seconds is roughly the year 2603.
pub const EPOCH_SECONDS_CEILING: i64 = 20_000_000_000;

type DateParser = fn(&str) -> Option<DateTime<Utc>>;

/// Calendar-style parsers, most common feed encodings first.
const CALENDAR_PARSERS: &[DateParser] = &[
    parse_rfc2822,
    parse_rfc3339,
    parse_rfc2822_lenient,
    parse_naive_utc,
    parse_epoch_str,
];

/// Parse a textual date from a feed field.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    CALENDAR_PARSERS.iter().find_map(|parse| parse(s))
}

/// Interpret a numeric epoch value (seconds or milliseconds, see [`EPOCH_SECONDS_CEILING`]).
pub fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.unsigned_abs() < EPOCH_SECONDS_CEILING as u64 {
        Utc.timestamp_opt(value, 0).single()
    } else {
        Utc.timestamp_millis_opt(value).single()
    }
}

/// JSON numbers may arrive as floats (`1751371200.0`); fractions are dropped.
pub fn from_epoch_f64(value: f64) -> Option<DateTime<Utc>> {
    let whole = value.trunc();
    // `as i64` saturates; anything outside the i64 range is not a date.
    if !whole.is_finite() || whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    from_epoch(whole as i64)
}

fn from_offset(dt: OffsetDateTime) -> Option<DateTime<Utc>> {
    let nanos = dt.unix_timestamp_nanos();
    let secs = i64::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
    let sub = u32::try_from(nanos.rem_euclid(1_000_000_000)).ok()?;
    Utc.timestamp_opt(secs, sub).single()
}

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(s, &Rfc2822).ok().and_then(from_offset)
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(s, &Rfc3339).ok().and_then(from_offset)
}

/// chrono accepts a few shapes `time` rejects (single-digit days, obsolete zones).
fn parse_rfc2822_lenient(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Offset-less ISO-like values are taken as UTC.
fn parse_naive_utc(s: &str) -> Option<DateTime<Utc>> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_epoch_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok().and_then(from_epoch)
}
