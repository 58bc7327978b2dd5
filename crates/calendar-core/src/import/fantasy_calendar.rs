//! Fantasy-Calendar.com adapter.
//!
//! Months come from `static_data.year_data.timespans`; leap days are separate
//! entries pointing at a timespan, each adding one day to that month in leap
//! years. Seasons usually carry no dates and are spread evenly over the year.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    check_season_start, clean_name, date_from_day_of_year, decode_json, deserialize,
    normalize_color, seasons_from_starts, ImportResult, SeasonStart,
};
use crate::detect::ImportFormat;
use crate::error::Result;
use crate::model::{Era, Month, Moon, Season, Weekday};

const FORMAT: &str = "Fantasy-Calendar.com";

#[derive(Debug, Deserialize)]
struct FcDocument {
    name: Option<String>,
    static_data: FcStatic,
    dynamic_data: FcDynamic,
}

#[derive(Debug, Deserialize)]
struct FcStatic {
    #[serde(default)]
    year_data: FcYearData,
    #[serde(default)]
    moons: Vec<FcMoon>,
    clock: Option<FcClock>,
    seasons: Option<FcSeasons>,
    #[serde(default)]
    eras: Vec<FcEra>,
}

#[derive(Debug, Default, Deserialize)]
struct FcYearData {
    #[serde(default)]
    global_week: Vec<String>,
    #[serde(default)]
    timespans: Vec<FcTimespan>,
    #[serde(default)]
    leap_days: Vec<FcLeapDay>,
}

#[derive(Debug, Deserialize)]
struct FcTimespan {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    length: i32,
}

#[derive(Debug, Deserialize)]
struct FcLeapDay {
    #[serde(default)]
    timespan: usize,
    interval: Option<Value>,
    #[serde(default)]
    offset: i32,
}

#[derive(Debug, Deserialize)]
struct FcMoon {
    #[serde(default)]
    name: String,
    cycle: f64,
    #[serde(default)]
    shift: f64,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FcClock {
    hours: Option<u32>,
    minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FcSeasons {
    #[serde(default)]
    data: Vec<FcSeason>,
}

#[derive(Debug, Deserialize)]
struct FcSeason {
    #[serde(default)]
    name: String,
    color: Option<Value>,
    timespan: Option<u32>,
    day: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FcEra {
    #[serde(default)]
    name: String,
    description: Option<String>,
    date: Option<FcEraDate>,
}

#[derive(Debug, Deserialize)]
struct FcEraDate {
    #[serde(default)]
    year: i64,
}

#[derive(Debug, Deserialize)]
struct FcDynamic {
    year: Option<i64>,
}

pub fn from_slice(bytes: &[u8]) -> Result<ImportResult> {
    parse(&decode_json(FORMAT, bytes)?)
}

pub fn parse(value: &Value) -> Result<ImportResult> {
    let doc: FcDocument = deserialize(FORMAT, value)?;
    let year_data = doc.static_data.year_data;

    let name = doc
        .name
        .as_deref()
        .map(clean_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Imported Calendar".to_string());
    let mut result = ImportResult::new(ImportFormat::FantasyCalendar, name);

    result.months = year_data
        .timespans
        .iter()
        .map(|t| Month {
            name: clean_name(&t.name),
            days: t.length,
            leap_year_days: 0,
            sort_order: 0,
            is_intercalary: t.kind == "intercalary",
        })
        .collect();

    for leap_day in &year_data.leap_days {
        match result.months.get_mut(leap_day.timespan) {
            Some(month) => month.leap_year_days = month.leap_year_days.saturating_add(1),
            None => warn!(
                timespan = leap_day.timespan,
                "leap day points at a missing timespan"
            ),
        }
    }
    if let Some(first) = year_data.leap_days.first() {
        result.settings.leap_year_every = first.interval.as_ref().map(leap_period).unwrap_or(0);
        result.settings.leap_year_offset = first.offset;
        if year_data
            .leap_days
            .iter()
            .any(|d| d.interval != first.interval)
        {
            warn!("leap days use differing intervals, only the first is kept");
        }
    }

    result.weekdays = year_data
        .global_week
        .iter()
        .map(|name| Weekday {
            name: clean_name(name),
            sort_order: 0,
        })
        .collect();

    result.moons = doc
        .static_data
        .moons
        .into_iter()
        .map(|m| Moon {
            name: clean_name(&m.name),
            cycle_days: m.cycle,
            phase_offset: m.shift,
            color: normalize_color(m.color.as_deref()),
        })
        .collect();

    let seasons = doc.static_data.seasons.map(|s| s.data).unwrap_or_default();
    result.seasons = convert_seasons(&result.months, seasons)?;

    result.eras = doc
        .static_data
        .eras
        .into_iter()
        .map(|e| Era {
            name: clean_name(&e.name),
            start_year: e.date.map(|d| d.year).unwrap_or(0),
            end_year: None,
            description: e.description.filter(|d| !d.trim().is_empty()),
            color: normalize_color(None),
            sort_order: 0,
        })
        .collect();

    if let Some(clock) = doc.static_data.clock {
        result.settings.hours_per_day = clock.hours.unwrap_or(24);
        result.settings.minutes_per_hour = clock.minutes.unwrap_or(60);
    }
    result.settings.current_year = doc.dynamic_data.year.unwrap_or(1);

    result.finish()
}

/// Smallest positive, non-negated term of an interval such as `"400,!100,4"`.
fn leap_period(interval: &Value) -> i32 {
    match interval {
        Value::Number(n) => n.as_i64().unwrap_or(0).clamp(0, i32::MAX as i64) as i32,
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|term| !term.starts_with('!'))
            .filter_map(|term| term.trim_start_matches('+').parse::<i32>().ok())
            .filter(|n| *n > 0)
            .min()
            .unwrap_or(0),
        _ => 0,
    }
}

/// Fantasy-Calendar seasons colour with either a string or a gradient array.
fn season_color(color: Option<&Value>) -> String {
    let first = match color {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Array(items)) => items.first().and_then(Value::as_str),
        _ => None,
    };
    normalize_color(first)
}

fn convert_seasons(months: &[Month], seasons: Vec<FcSeason>) -> Result<Vec<Season>> {
    if seasons.is_empty() {
        return Ok(Vec::new());
    }

    let explicit = seasons
        .iter()
        .all(|s| s.timespan.is_some() && s.day.is_some());
    if explicit {
        let mut starts = Vec::with_capacity(seasons.len());
        for s in seasons {
            let name = clean_name(&s.name);
            let month = s.timespan.unwrap_or(0).saturating_add(1);
            let day = s.day.unwrap_or(1).max(1);
            check_season_start(FORMAT, months, &name, month, day)?;
            starts.push(SeasonStart {
                month,
                day,
                color: season_color(s.color.as_ref()),
                name,
                description: None,
            });
        }
        return Ok(seasons_from_starts(months, starts));
    }

    // No dates: split the year evenly, giving leftover days to the earliest seasons.
    let year_length: i64 = months.iter().map(|m| m.days.max(0) as i64).sum();
    let count = seasons.len() as i64;
    let base = year_length / count;
    let extra = year_length % count;
    debug!(year_length, seasons = count, "synthesizing season ranges");

    let mut start = 1i64;
    Ok(seasons
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let length = base + i64::from((i as i64) < extra);
            let end = (start + length - 1).max(start);
            let (start_month, start_day) = date_from_day_of_year(months, start);
            let (end_month, end_day) = date_from_day_of_year(months, end);
            start = end + 1;
            Season {
                name: clean_name(&s.name),
                start_month,
                start_day,
                end_month,
                end_day,
                description: None,
                color: season_color(s.color.as_ref()),
                weather_effect: None,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leap_period_picks_smallest_plain_term() {
        assert_eq!(leap_period(&json!("400,!100,4")), 4);
        assert_eq!(leap_period(&json!("4")), 4);
        assert_eq!(leap_period(&json!(5)), 5);
        assert_eq!(leap_period(&json!("!100")), 0);
    }

    #[test]
    fn season_color_accepts_gradient_arrays() {
        assert_eq!(season_color(Some(&json!(["#112233", "#445566"]))), "#112233");
        assert_eq!(season_color(Some(&json!("abcdef"))), "#abcdef");
        assert_eq!(season_color(None), "#808080");
    }
}
