//! Calendaria adapter.
//!
//! Calendaria keeps months, seasons, eras, moons and festivals in objects keyed
//! by arbitrary ids, each entry carrying an explicit `ordinal`. Collections may
//! sit directly under their key or inside a `values` wrapper. Weekdays and the
//! clock live together under `days`.
//!
//! `leapDays` is a month's TOTAL leap-year length. Seasons are 1-based
//! day-of-year ranges over the ordinal-sorted months. Festivals become
//! yearly-recurring events.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{
    clean_name, date_from_day_of_year, day_before, decode_json, deserialize, keyed_entries,
    leap_extra, normalize_color, ImportResult,
};
use crate::detect::ImportFormat;
use crate::error::Result;
use crate::event::{EventInput, RecurrenceType};
use crate::model::{Era, Month, Moon, Season, Weekday};

const FORMAT: &str = "Calendaria";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaDocument {
    name: Option<String>,
    description: Option<String>,
    days: Option<Value>,
    months: Option<Value>,
    seasons: Option<Value>,
    eras: Option<Value>,
    moons: Option<Value>,
    festivals: Option<Value>,
    years: Option<CaYears>,
    leap_year_config: Option<CaLeapConfig>,
    current_date: Option<CaCurrentDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaClock {
    hours_per_day: Option<u32>,
    minutes_per_hour: Option<u32>,
    seconds_per_minute: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaYears {
    leap_year: Option<CaLeapYear>,
    suffix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaLeapYear {
    #[serde(default)]
    leap_interval: i32,
    #[serde(default)]
    leap_start: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaLeapConfig {
    rule: Option<String>,
    #[serde(default)]
    interval: i32,
    #[serde(default)]
    start: i32,
}

#[derive(Debug, Deserialize)]
struct CaCurrentDate {
    year: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaMonth {
    name: String,
    #[serde(default)]
    days: i32,
    leap_days: Option<i32>,
    #[serde(default)]
    ordinal: f64,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaWeekday {
    name: String,
    #[serde(default)]
    ordinal: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaSeason {
    name: String,
    day_start: Option<i64>,
    day_end: Option<i64>,
    #[serde(default)]
    ordinal: f64,
    color: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaEra {
    name: String,
    #[serde(default)]
    start_year: i64,
    end_year: Option<i64>,
    description: Option<String>,
    color: Option<String>,
    #[serde(default)]
    ordinal: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaMoon {
    name: String,
    cycle_length: f64,
    #[serde(default)]
    cycle_day_adjust: f64,
    color: Option<String>,
    #[serde(default)]
    ordinal: f64,
}

#[derive(Debug, Deserialize)]
struct CaFestival {
    name: String,
    month: u32,
    day: u32,
    #[serde(default)]
    ordinal: f64,
    description: Option<String>,
}

/// Read an optional keyed collection and order it by `ordinal`.
fn sorted<T, F>(what: &str, value: Option<&Value>, ordinal: F) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    F: Fn(&T) -> f64,
{
    let mut entries: Vec<T> = match value {
        Some(value) => keyed_entries(FORMAT, what, value)?,
        None => Vec::new(),
    };
    entries.sort_by(|a, b| ordinal(a).total_cmp(&ordinal(b)));
    Ok(entries)
}

pub fn from_slice(bytes: &[u8]) -> Result<ImportResult> {
    parse(&decode_json(FORMAT, bytes)?)
}

pub fn parse(value: &Value) -> Result<ImportResult> {
    let doc: CaDocument = deserialize(FORMAT, value)?;

    let name = doc
        .name
        .as_deref()
        .map(clean_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Imported Calendar".to_string());
    let mut result = ImportResult::new(ImportFormat::Calendaria, name);

    let months = sorted("months", doc.months.as_ref(), |m: &CaMonth| m.ordinal)?;
    result.months = months
        .into_iter()
        .map(|m| Month {
            name: clean_name(&m.name),
            days: m.days,
            leap_year_days: leap_extra(m.leap_days, m.days),
            sort_order: 0,
            is_intercalary: m.kind.as_deref() == Some("intercalary"),
        })
        .collect();

    // Weekdays share `days` with the clock, so only the wrapped or list shape applies.
    let weekday_source = doc
        .days
        .as_ref()
        .and_then(|days| if days.is_array() { Some(days) } else { days.get("values") });
    let weekdays = sorted("weekdays", weekday_source, |w: &CaWeekday| w.ordinal)?;
    result.weekdays = weekdays
        .into_iter()
        .map(|w| Weekday {
            name: clean_name(&w.name),
            sort_order: 0,
        })
        .collect();

    let seasons = sorted("seasons", doc.seasons.as_ref(), |s: &CaSeason| s.ordinal)?;
    result.seasons = seasons_from_ranges(&result.months, seasons);

    let eras = sorted("eras", doc.eras.as_ref(), |e: &CaEra| e.ordinal)?;
    result.eras = eras
        .into_iter()
        .map(|e| Era {
            name: clean_name(&e.name),
            start_year: e.start_year,
            end_year: e.end_year,
            description: e.description,
            color: normalize_color(e.color.as_deref()),
            sort_order: 0,
        })
        .collect();

    let moons = sorted("moons", doc.moons.as_ref(), |m: &CaMoon| m.ordinal)?;
    result.moons = moons
        .into_iter()
        .map(|m| Moon {
            name: clean_name(&m.name),
            cycle_days: m.cycle_length,
            phase_offset: m.cycle_day_adjust,
            color: normalize_color(m.color.as_deref()),
        })
        .collect();

    let clock: CaClock = match &doc.days {
        Some(days) if days.is_object() => deserialize(FORMAT, days)?,
        _ => CaClock::default(),
    };
    let settings = &mut result.settings;
    settings.description = doc.description;
    settings.hours_per_day = clock.hours_per_day.unwrap_or(24);
    settings.minutes_per_hour = clock.minutes_per_hour.unwrap_or(60);
    settings.seconds_per_minute = clock.seconds_per_minute.unwrap_or(60);
    settings.current_year = doc.current_date.and_then(|d| d.year).unwrap_or(1);

    if let Some(years) = &doc.years {
        settings.epoch_name = years
            .suffix
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some(leap) = &years.leap_year {
            settings.leap_year_every = leap.leap_interval.max(0);
            settings.leap_year_offset = leap.leap_start;
        }
    }
    if let Some(config) = &doc.leap_year_config {
        let (every, offset) = match config.rule.as_deref() {
            Some("none") => (0, 0),
            Some("gregorian") => (4, 0),
            _ => (config.interval.max(0), config.start),
        };
        settings.leap_year_every = every;
        settings.leap_year_offset = offset;
    }

    let festivals = sorted("festivals", doc.festivals.as_ref(), |f: &CaFestival| {
        f.ordinal
    })?;
    let current_year = result.settings.current_year;
    result.events = festivals
        .into_iter()
        .filter_map(|f| festival_event(&result.months, current_year, f))
        .collect();

    result.finish()
}

/// Convert 1-based day-of-year ranges into month/day seasons.
///
/// A missing start defaults to the first day of the year; a missing end closes
/// the day before the next season begins.
fn seasons_from_ranges(months: &[Month], seasons: Vec<CaSeason>) -> Vec<Season> {
    let starts: Vec<(u32, u32)> = seasons
        .iter()
        .map(|s| date_from_day_of_year(months, s.day_start.unwrap_or(1)))
        .collect();
    let count = seasons.len();

    seasons
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let (start_month, start_day) = starts[i];
            let (end_month, end_day) = match s.day_end {
                Some(end) => date_from_day_of_year(months, end),
                None => {
                    let (next_month, next_day) = starts[(i + 1) % count];
                    day_before(months, next_month, next_day)
                }
            };
            Season {
                name: clean_name(&s.name),
                start_month,
                start_day,
                end_month,
                end_day,
                description: s.description,
                color: normalize_color(s.color.as_deref()),
                weather_effect: None,
            }
        })
        .collect()
}

fn festival_event(months: &[Month], year: i64, festival: CaFestival) -> Option<EventInput> {
    let month = match (festival.month as usize)
        .checked_sub(1)
        .and_then(|idx| months.get(idx))
    {
        Some(month) => month,
        None => {
            warn!(
                festival = %festival.name,
                month = festival.month,
                "skipping festival in a missing month"
            );
            return None;
        }
    };
    if festival.day == 0 || i64::from(festival.day) > i64::from(month.days) {
        warn!(
            festival = %festival.name,
            month = festival.month,
            day = festival.day,
            "skipping festival outside its month"
        );
        return None;
    }
    let mut event = EventInput::on(clean_name(&festival.name), year, festival.month, festival.day);
    event.description = festival.description;
    event.is_recurring = true;
    event.recurrence_type = Some(RecurrenceType::Yearly.as_str().to_string());
    event.category = Some("festival".to_string());
    Some(event)
}
