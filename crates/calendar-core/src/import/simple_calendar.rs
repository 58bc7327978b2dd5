//! Simple Calendar adapter (Foundry VTT module exports, v1 and v2).
//!
//! - v1 wraps a single calendar in a top-level `calendar` object. Older exports
//!   keep their lists under `*Settings` names (`monthSettings`, `timeSettings`,
//!   ...), either inside that object or at the document root. A modern field
//!   wins whenever it is non-empty.
//! - v2 carries `exportVersion` and a `calendars` array; the first entry is used.
//!
//! Months, days and season starts are 0-indexed and become 1-indexed here.
//! `numberOfLeapYearDays` is the month's TOTAL length in a leap year.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{
    check_season_start, clean_name, decode_json, deserialize, leap_extra, normalize_color,
    seasons_from_starts, ImportResult, SeasonStart,
};
use crate::detect::ImportFormat;
use crate::error::{CalendarError, Result};
use crate::model::{Calendar, Month, Moon, Weekday};

const FORMAT: &str = "Simple Calendar";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScCalendar {
    name: Option<String>,
    description: Option<String>,
    current_date: Option<ScCurrentDate>,
    #[serde(default)]
    months: Vec<ScMonth>,
    #[serde(default)]
    month_settings: Vec<ScMonth>,
    #[serde(default)]
    weekdays: Vec<ScWeekday>,
    #[serde(default)]
    weekday_settings: Vec<ScWeekday>,
    #[serde(default)]
    seasons: Vec<ScSeason>,
    #[serde(default)]
    season_settings: Vec<ScSeason>,
    #[serde(default)]
    moons: Vec<ScMoon>,
    #[serde(default)]
    moon_settings: Vec<ScMoon>,
    year: Option<ScYear>,
    year_settings: Option<ScYear>,
    time: Option<ScTime>,
    time_settings: Option<ScTime>,
    leap_year: Option<ScLeapYear>,
    leap_year_settings: Option<ScLeapYear>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScExportV2 {
    #[serde(default)]
    calendars: Vec<ScCalendar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScCurrentDate {
    year: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScMonth {
    #[serde(default)]
    name: String,
    #[serde(alias = "days")]
    number_of_days: i32,
    number_of_leap_year_days: Option<i32>,
    #[serde(default)]
    intercalary: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ScWeekday {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScSeason {
    #[serde(default)]
    name: String,
    #[serde(default)]
    starting_month: u32,
    #[serde(default)]
    starting_day: u32,
    color: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScMoon {
    #[serde(default)]
    name: String,
    cycle_length: f64,
    #[serde(default)]
    cycle_day_adjust: f64,
    color: Option<String>,
    first_new_moon: Option<ScFirstNewMoon>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScFirstNewMoon {
    #[serde(default)]
    year: i64,
    #[serde(default)]
    month: u32,
    #[serde(default)]
    day: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScYear {
    numeric_representation: Option<i64>,
    prefix: Option<String>,
    postfix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScTime {
    hours_in_day: Option<u32>,
    minutes_in_hour: Option<u32>,
    seconds_in_minute: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScLeapYear {
    #[serde(default)]
    rule: String,
    custom_mod: Option<i32>,
}

/// First non-empty list among the modern field and its legacy fallbacks.
fn pick<T: Clone>(candidates: [&Vec<T>; 3]) -> Vec<T> {
    candidates
        .into_iter()
        .find(|list| !list.is_empty())
        .cloned()
        .unwrap_or_default()
}

fn pick_opt<T: Clone>(candidates: [&Option<T>; 3]) -> Option<T> {
    candidates.into_iter().find_map(|c| c.clone())
}

pub fn from_slice(bytes: &[u8]) -> Result<ImportResult> {
    parse(&decode_json(FORMAT, bytes)?)
}

pub fn parse(value: &Value) -> Result<ImportResult> {
    // Root-level legacy settings from the oldest exports.
    let root: ScCalendar = deserialize(FORMAT, value)?;

    let calendar: ScCalendar = match value.get("calendar") {
        Some(inner) => deserialize(FORMAT, inner)?,
        None => {
            let v2: ScExportV2 = deserialize(FORMAT, value)?;
            v2.calendars
                .into_iter()
                .next()
                .ok_or_else(|| CalendarError::decode(FORMAT, "export contains no calendars"))?
        }
    };

    convert(&calendar, &root)
}

fn convert(cal: &ScCalendar, root: &ScCalendar) -> Result<ImportResult> {
    let name = cal
        .name
        .as_deref()
        .map(clean_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Imported Calendar".to_string());
    let mut result = ImportResult::new(ImportFormat::SimpleCalendar, name);

    result.months = pick([&cal.months, &cal.month_settings, &root.month_settings])
        .into_iter()
        .map(|m| Month {
            name: clean_name(&m.name),
            days: m.number_of_days,
            leap_year_days: leap_extra(m.number_of_leap_year_days, m.number_of_days),
            sort_order: 0,
            is_intercalary: m.intercalary,
        })
        .collect();

    result.weekdays = pick([&cal.weekdays, &cal.weekday_settings, &root.weekday_settings])
        .into_iter()
        .map(|w| Weekday {
            name: clean_name(&w.name),
            sort_order: 0,
        })
        .collect();

    if result.months.is_empty() {
        return Err(CalendarError::decode(FORMAT, "calendar defines no months"));
    }
    let month_count = result.months.len() as u32;
    let mut starts = Vec::new();
    for s in pick([&cal.seasons, &cal.season_settings, &root.season_settings]) {
        let name = clean_name(&s.name);
        let month = s.starting_month.saturating_add(1).min(month_count);
        let day = s.starting_day.saturating_add(1);
        check_season_start(FORMAT, &result.months, &name, month, day)?;
        starts.push(SeasonStart {
            name,
            month,
            day,
            color: normalize_color(s.color.as_deref()),
            description: s.description.filter(|d| !d.trim().is_empty()),
        });
    }
    result.seasons = seasons_from_starts(&result.months, starts);

    // Scratch calendar for placing each moon's first new moon on the absolute-day axis.
    let mut scratch = Calendar::new("", "", "");
    scratch.months = result.months.clone();
    result.moons = pick([&cal.moons, &cal.moon_settings, &root.moon_settings])
        .into_iter()
        .map(|m| moon_from(&scratch, m))
        .collect();

    let settings = &mut result.settings;
    settings.description = cal.description.clone();
    if let Some(time) = pick_opt([&cal.time, &cal.time_settings, &root.time_settings]) {
        settings.hours_per_day = time.hours_in_day.unwrap_or(24);
        settings.minutes_per_hour = time.minutes_in_hour.unwrap_or(60);
        settings.seconds_per_minute = time.seconds_in_minute.unwrap_or(60);
    }

    let year = pick_opt([&cal.year, &cal.year_settings, &root.year_settings]);
    if let Some(year) = &year {
        settings.epoch_name = [&year.postfix, &year.prefix]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty());
    }
    settings.current_year = [&cal.current_date, &root.current_date]
        .into_iter()
        .flatten()
        .find_map(|d| d.year)
        .or_else(|| year.as_ref().and_then(|y| y.numeric_representation))
        .unwrap_or(1);

    if let Some(leap) = pick_opt([&cal.leap_year, &cal.leap_year_settings, &root.leap_year_settings])
    {
        settings.leap_year_every = match leap.rule.as_str() {
            "gregorian" => 4,
            "custom" => leap.custom_mod.unwrap_or(0).max(0),
            "none" | "" => 0,
            other => {
                warn!(rule = other, "unknown Simple Calendar leap rule, leap years disabled");
                0
            }
        };
    }

    result.finish()
}

/// Convert a moon, aligning phase zero with its first new moon when one is given.
fn moon_from(scratch: &Calendar, moon: ScMoon) -> Moon {
    let cycle = moon.cycle_length;
    let phase_offset = match &moon.first_new_moon {
        Some(first) if cycle > 0.0 => {
            let anchor = scratch.absolute_day(
                first.year,
                first.month.saturating_add(1),
                first.day.saturating_add(1),
            );
            (moon.cycle_day_adjust - anchor as f64).rem_euclid(cycle)
        }
        _ => moon.cycle_day_adjust,
    };
    Moon {
        name: clean_name(&moon.name),
        cycle_days: cycle,
        phase_offset,
        color: normalize_color(moon.color.as_deref()),
    }
}
