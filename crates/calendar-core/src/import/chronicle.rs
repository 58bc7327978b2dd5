//! Chronicle adapter -- the native schema, copied across structurally.

use serde_json::Value;

use super::{decode_json, deserialize, ImportResult, ImportSettings};
use crate::detect::ImportFormat;
use crate::error::Result;
use crate::export::ChronicleDocument;

const FORMAT: &str = "Chronicle";

pub fn from_slice(bytes: &[u8]) -> Result<ImportResult> {
    parse(&decode_json(FORMAT, bytes)?)
}

pub fn parse(value: &Value) -> Result<ImportResult> {
    let document: ChronicleDocument = deserialize(FORMAT, value)?;
    let calendar = document.calendar;

    let mut result = ImportResult::new(ImportFormat::Chronicle, calendar.name);
    result.months = calendar.months;
    result.months.sort_by_key(|m| m.sort_order);
    result.weekdays = calendar.weekdays;
    result.weekdays.sort_by_key(|w| w.sort_order);
    result.eras = calendar.eras;
    result.eras.sort_by_key(|e| e.sort_order);
    result.moons = calendar.moons;
    result.seasons = calendar.seasons;
    result.settings = ImportSettings {
        mode: Some(calendar.mode),
        description: calendar.description,
        epoch_name: calendar.epoch_name,
        current_year: calendar.current_year,
        hours_per_day: calendar.hours_per_day,
        minutes_per_hour: calendar.minutes_per_hour,
        seconds_per_minute: calendar.seconds_per_minute,
        leap_year_every: calendar.leap_year_every,
        leap_year_offset: calendar.leap_year_offset,
    };
    result.events = document.events.unwrap_or_default();
    result.finish()
}
