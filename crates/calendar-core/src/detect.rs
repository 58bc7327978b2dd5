//! Import format detection by key-presence fingerprints.
//!
//! The four supported schemas evolved independently and their fingerprints
//! overlap, so the checks run in a fixed priority order and the first match
//! wins:
//!
//! 1. `format == "chronicle-calendar-v1"` → Chronicle
//! 2. a `calendar` key → Simple Calendar (v1)
//! 3. `exportVersion` plus a `calendars` array → Simple Calendar (v2)
//! 4. `static_data` plus `dynamic_data` → Fantasy-Calendar.com
//! 5. a `days` object with `hoursPerDay`, or a `months` object → Calendaria

use serde_json::Value;

use crate::error::{CalendarError, Result};
use crate::import::decode_json;

/// Format identifier written into Chronicle exports.
pub const CHRONICLE_FORMAT_ID: &str = "chronicle-calendar-v1";

/// A recognised (or unrecognised) external calendar schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Chronicle,
    SimpleCalendar,
    Calendaria,
    FantasyCalendar,
    Unknown,
}

impl ImportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ImportFormat::Chronicle => "Chronicle",
            ImportFormat::SimpleCalendar => "Simple Calendar",
            ImportFormat::Calendaria => "Calendaria",
            ImportFormat::FantasyCalendar => "Fantasy-Calendar.com",
            ImportFormat::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify raw JSON bytes.
///
/// # Errors
/// Returns `CalendarError::Decode` if the bytes are not valid JSON. Valid JSON that
/// matches no fingerprint (including non-object JSON) is `ImportFormat::Unknown`.
pub fn detect_format(bytes: &[u8]) -> Result<ImportFormat> {
    let value = decode_json("JSON", bytes)?;
    Ok(detect_value(&value))
}

/// Classify an already-decoded JSON document.
pub fn detect_value(value: &Value) -> ImportFormat {
    let Some(root) = value.as_object() else {
        return ImportFormat::Unknown;
    };

    if root.get("format").and_then(Value::as_str) == Some(CHRONICLE_FORMAT_ID) {
        return ImportFormat::Chronicle;
    }
    if root.contains_key("calendar") {
        return ImportFormat::SimpleCalendar;
    }
    if root.contains_key("exportVersion") && root.get("calendars").is_some_and(Value::is_array) {
        return ImportFormat::SimpleCalendar;
    }
    if root.contains_key("static_data") && root.contains_key("dynamic_data") {
        return ImportFormat::FantasyCalendar;
    }

    let days_has_clock = root
        .get("days")
        .and_then(Value::as_object)
        .is_some_and(|days| days.contains_key("hoursPerDay"));
    let months_is_map = root.get("months").is_some_and(Value::is_object);
    if days_has_clock || months_is_map {
        return ImportFormat::Calendaria;
    }

    ImportFormat::Unknown
}

/// Like [`detect_value`], but an unknown document is an error naming every supported format.
pub fn require_known(value: &Value) -> Result<ImportFormat> {
    match detect_value(value) {
        ImportFormat::Unknown => Err(CalendarError::UnrecognizedFormat),
        format => Ok(format),
    }
}
