//! Chronicle export -- serialise a hydrated calendar into the canonical schema.
//!
//! The same document types are read back by the Chronicle import adapter, so an
//! export is always a valid import.

use serde::{Deserialize, Serialize};

use crate::detect::CHRONICLE_FORMAT_ID;
use crate::error::Result;
use crate::event::{Event, EventInput};
use crate::model::{Calendar, CalendarMode, Era, Month, Moon, Season, Weekday};

/// Schema version written by [`export_calendar`].
pub const CHRONICLE_VERSION: u32 = 1;

/// Top-level Chronicle document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChronicleDocument {
    pub format: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub calendar: ChronicleCalendar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventInput>>,
}

/// Calendar body of a Chronicle document: flat settings plus every sub-resource list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChronicleCalendar {
    pub name: String,
    #[serde(default)]
    pub mode: CalendarMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "one")]
    pub current_year: i64,
    #[serde(default = "one_u32")]
    pub current_month: u32,
    #[serde(default = "one_u32")]
    pub current_day: u32,
    #[serde(default)]
    pub current_hour: u32,
    #[serde(default)]
    pub current_minute: u32,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: u32,
    #[serde(default = "sixty")]
    pub minutes_per_hour: u32,
    #[serde(default = "sixty")]
    pub seconds_per_minute: u32,
    #[serde(default)]
    pub leap_year_every: i32,
    #[serde(default)]
    pub leap_year_offset: i32,
    #[serde(default)]
    pub months: Vec<Month>,
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    #[serde(default)]
    pub moons: Vec<Moon>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub eras: Vec<Era>,
}

fn default_version() -> u32 {
    CHRONICLE_VERSION
}

fn one() -> i64 {
    1
}

fn one_u32() -> u32 {
    1
}

fn default_hours_per_day() -> u32 {
    24
}

fn sixty() -> u32 {
    60
}

/// Build the canonical document for `calendar`.
///
/// `events` is written only when `Some`; every other list is always present,
/// possibly empty.
pub fn export_calendar(calendar: &Calendar, events: Option<&[Event]>) -> ChronicleDocument {
    ChronicleDocument {
        format: CHRONICLE_FORMAT_ID.to_string(),
        version: CHRONICLE_VERSION,
        calendar: ChronicleCalendar {
            name: calendar.name.clone(),
            mode: calendar.mode,
            epoch_name: calendar.epoch_name.clone(),
            description: calendar.description.clone(),
            current_year: calendar.current.year,
            current_month: calendar.current.month,
            current_day: calendar.current.day,
            current_hour: calendar.current.hour,
            current_minute: calendar.current.minute,
            hours_per_day: calendar.hours_per_day,
            minutes_per_hour: calendar.minutes_per_hour,
            seconds_per_minute: calendar.seconds_per_minute,
            leap_year_every: calendar.leap_year_every,
            leap_year_offset: calendar.leap_year_offset,
            months: calendar.months.clone(),
            weekdays: calendar.weekdays.clone(),
            moons: calendar.moons.clone(),
            seasons: calendar.seasons.clone(),
            eras: calendar.eras.clone(),
        },
        events: events.map(|events| events.iter().map(Event::to_input).collect()),
    }
}

/// Compact JSON for a document.
pub fn to_json(document: &ChronicleDocument) -> Result<String> {
    Ok(serde_json::to_string(document)?)
}

/// Pretty-printed JSON for a document.
pub fn to_json_pretty(document: &ChronicleDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
