//! Date normalization for the loosely formatted timestamps the inventory API
//! returns.
//!
//! Every value goes through [`normalize`], which never fails: anything that is
//! not a recognizable timestamp comes back as `None`.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;

/// Formats carrying a time component, tried first.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Date-only formats. Day-first is tried before month-first, so an ambiguous
/// value such as `03/04/2024` reads as 3 April.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Offset markers removed before parsing. All timestamps are treated as naive.
const OFFSET_MARKERS: &[&str] = &["+00:00", "Z"];

/// Format used by [`canonical`]; accepted by [`parse_date_str`].
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Display format for dates on cards and in exports.
pub const DISPLAY_FORMAT: &str = "%d %b %Y";

// ---------------------------------------------------------------------------
// ToTimestamp
// ---------------------------------------------------------------------------

/// Anything the normalizer knows how to turn into a canonical timestamp.
pub trait ToTimestamp {
    fn to_timestamp(&self) -> Option<NaiveDateTime>;
}

impl ToTimestamp for NaiveDateTime {
    fn to_timestamp(&self) -> Option<NaiveDateTime> {
        Some(*self)
    }
}

impl ToTimestamp for str {
    fn to_timestamp(&self) -> Option<NaiveDateTime> {
        parse_date_str(self)
    }
}

impl ToTimestamp for Value {
    fn to_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::String(s) => parse_date_str(s),
            _ => None,
        }
    }
}

impl<T: ToTimestamp + ?Sized> ToTimestamp for Option<&T> {
    fn to_timestamp(&self) -> Option<NaiveDateTime> {
        self.and_then(|v| v.to_timestamp())
    }
}

/// Normalize any supported value to a timestamp, or `None`.
pub fn normalize<T: ToTimestamp + ?Sized>(value: &T) -> Option<NaiveDateTime> {
    value.to_timestamp()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a date string against the fixed format list; first match wins.
pub fn parse_date_str(raw: &str) -> Option<NaiveDateTime> {
    let mut cleaned = raw.trim().to_string();
    for marker in OFFSET_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(ts);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Canonical string form of a timestamp. Round-trips through [`parse_date_str`].
pub fn canonical(ts: &NaiveDateTime) -> String {
    ts.format(CANONICAL_FORMAT).to_string()
}

/// `05 Mar 2024`-style rendering used by cards and exports.
pub fn display(ts: &NaiveDateTime) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

/// Today's calendar date in the display time zone.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
