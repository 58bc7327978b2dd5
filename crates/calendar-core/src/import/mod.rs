//! Import pipeline -- detect the schema of a foreign calendar file and normalise it.
//!
//! Every adapter turns its own JSON shape into an [`ImportResult`] that follows
//! the canonical conventions:
//!
//! - list entries carry a 0-based `sort_order` equal to their display position
//! - season and event dates use 1-based months and days
//! - `leap_year_days` counts the EXTRA days a month gains in a leap year
//!
//! Adapters are pure: bytes (or a decoded [`Value`]) in, `ImportResult` out.

pub mod calendaria;
pub mod chronicle;
pub mod fantasy_calendar;
pub mod simple_calendar;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::detect::{require_known, ImportFormat};
use crate::error::{CalendarError, Result};
use crate::event::EventInput;
use crate::model::{CalendarMode, Era, Month, Moon, Season, Weekday, DEFAULT_COLOR};

/// Calendar-level settings carried by an import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub mode: Option<CalendarMode>,
    pub description: Option<String>,
    pub epoch_name: Option<String>,
    pub current_year: i64,
    pub hours_per_day: u32,
    pub minutes_per_hour: u32,
    pub seconds_per_minute: u32,
    pub leap_year_every: i32,
    pub leap_year_offset: i32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            mode: None,
            description: None,
            epoch_name: None,
            current_year: 1,
            hours_per_day: 24,
            minutes_per_hour: 60,
            seconds_per_minute: 60,
            leap_year_every: 0,
            leap_year_offset: 0,
        }
    }
}

/// A foreign calendar normalised into canonical sub-resources.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub format: ImportFormat,
    pub calendar_name: String,
    pub months: Vec<Month>,
    pub weekdays: Vec<Weekday>,
    pub moons: Vec<Moon>,
    pub seasons: Vec<Season>,
    pub eras: Vec<Era>,
    pub settings: ImportSettings,
    /// Only formats that carry dated entries populate this.
    pub events: Vec<EventInput>,
}

impl ImportResult {
    pub(crate) fn new(format: ImportFormat, calendar_name: String) -> Self {
        Self {
            format,
            calendar_name,
            months: Vec::new(),
            weekdays: Vec::new(),
            moons: Vec::new(),
            seasons: Vec::new(),
            eras: Vec::new(),
            settings: ImportSettings::default(),
            events: Vec::new(),
        }
    }

    /// Renumber `sort_order` by position and reject calendars without months.
    pub(crate) fn finish(mut self) -> Result<Self> {
        if self.months.is_empty() {
            return Err(CalendarError::decode(
                self.format.name(),
                "calendar defines no months",
            ));
        }
        for (i, month) in self.months.iter_mut().enumerate() {
            month.sort_order = i as u32;
        }
        for (i, weekday) in self.weekdays.iter_mut().enumerate() {
            weekday.sort_order = i as u32;
        }
        for (i, era) in self.eras.iter_mut().enumerate() {
            era.sort_order = i as u32;
        }
        Ok(self)
    }
}

/// Detect the format of `bytes` and run the matching adapter.
///
/// # Errors
/// - `CalendarError::Decode` if the bytes are not JSON or the adapter cannot read them
/// - `CalendarError::UnrecognizedFormat` if no fingerprint matches
pub fn parse_import(bytes: &[u8]) -> Result<ImportResult> {
    let value = decode_json("JSON", bytes)?;
    parse_value(&value)
}

/// Run the adapter matching an already-decoded document.
pub fn parse_value(value: &Value) -> Result<ImportResult> {
    let format = require_known(value)?;
    tracing::debug!(%format, "detected calendar format");
    match format {
        ImportFormat::Chronicle => chronicle::parse(value),
        ImportFormat::SimpleCalendar => simple_calendar::parse(value),
        ImportFormat::Calendaria => calendaria::parse(value),
        ImportFormat::FantasyCalendar => fantasy_calendar::parse(value),
        ImportFormat::Unknown => Err(CalendarError::UnrecognizedFormat),
    }
}

pub(crate) fn decode_json(format: &'static str, bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| CalendarError::decode(format, e.to_string()))
}

pub(crate) fn deserialize<T: DeserializeOwned>(format: &'static str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| CalendarError::decode(format, e.to_string()))
}

/// Drop a localisation-key prefix: `"CALENDAR.Months.Hammer"` becomes `"Hammer"`.
pub fn clean_name(name: &str) -> String {
    let trimmed = name.trim();
    match trimmed.rsplit_once('.') {
        Some((_, tail)) => tail.trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Trim, default empty to grey, and add a missing `#`.
pub fn normalize_color(color: Option<&str>) -> String {
    let trimmed = color.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        DEFAULT_COLOR.to_string()
    } else if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{}", trimmed)
    }
}

/// Convert a TOTAL leap-year length into canonical extra days.
pub(crate) fn leap_extra(total: Option<i32>, base: i32) -> i32 {
    total.map(|t| t.saturating_sub(base).max(0)).unwrap_or(0)
}

/// Reject a season start that names a month or day the calendar does not have.
///
/// `month` and `day` are 1-based; the day may use the month's leap-year length.
pub(crate) fn check_season_start(
    format: &'static str,
    months: &[Month],
    name: &str,
    month: u32,
    day: u32,
) -> Result<()> {
    let longest = month
        .checked_sub(1)
        .and_then(|idx| months.get(idx as usize))
        .map(|m| m.days as i64 + m.leap_year_days.max(0) as i64);
    match longest {
        Some(len) if day >= 1 && day as i64 <= len => Ok(()),
        Some(len) => Err(CalendarError::decode(
            format,
            format!("season '{}' starts on day {} of a {}-day month", name, day, len),
        )),
        None => Err(CalendarError::decode(
            format,
            format!(
                "season '{}' starts in month {} but the calendar has {}",
                name,
                month,
                months.len()
            ),
        )),
    }
}

/// The 1-based month/day immediately before `month`/`day`, wrapping from the
/// first day of the year to the last day of the last month.
pub(crate) fn day_before(months: &[Month], month: u32, day: u32) -> (u32, u32) {
    if day > 1 {
        return (month, day - 1);
    }
    let previous = if month <= 1 || month as usize > months.len() {
        months.len() as u32
    } else {
        month - 1
    };
    let days = months
        .get(previous.saturating_sub(1) as usize)
        .map(|m| m.days.max(1) as u32)
        .unwrap_or(1);
    (previous.max(1), days)
}

/// Map a 1-based day of the year onto a 1-based month/day, clamping to the year.
pub(crate) fn date_from_day_of_year(months: &[Month], day_of_year: i64) -> (u32, u32) {
    let mut remaining = day_of_year.max(1);
    for (i, month) in months.iter().enumerate() {
        let len = month.days.max(0) as i64;
        if remaining <= len {
            return (i as u32 + 1, remaining as u32);
        }
        remaining -= len;
    }
    match months.last() {
        Some(last) => (months.len() as u32, last.days.max(1) as u32),
        None => (1, 1),
    }
}

/// A season known only by where it begins.
#[derive(Debug, Clone)]
pub(crate) struct SeasonStart {
    pub name: String,
    pub month: u32,
    pub day: u32,
    pub color: String,
    pub description: Option<String>,
}

/// Seasons that only know their start: each ends the day before the next one
/// starts, and the last wraps around to the first.
pub(crate) fn seasons_from_starts(months: &[Month], starts: Vec<SeasonStart>) -> Vec<Season> {
    let count = starts.len();
    let ends: Vec<(u32, u32)> = (0..count)
        .map(|i| {
            let next = &starts[(i + 1) % count];
            day_before(months, next.month, next.day)
        })
        .collect();

    starts
        .into_iter()
        .zip(ends)
        .map(|(start, (end_month, end_day))| Season {
            name: start.name,
            start_month: start.month,
            start_day: start.day,
            end_month,
            end_day,
            description: start.description,
            color: start.color,
            weather_effect: None,
        })
        .collect()
}

/// Read a collection that may be a list or a map keyed by arbitrary ids,
/// optionally wrapped in a `values` object.
///
/// The direct shape is tried first; only when it does not decode is the
/// `values` wrapper consulted.
pub(crate) fn keyed_entries<T: DeserializeOwned>(
    format: &'static str,
    what: &str,
    value: &Value,
) -> Result<Vec<T>> {
    match collection_entries(value) {
        Ok(entries) => Ok(entries),
        Err(direct_err) => match value.get("values") {
            Some(wrapped) => collection_entries(wrapped)
                .map_err(|e| CalendarError::decode(format, format!("{}: {}", what, e))),
            None => Err(CalendarError::decode(
                format,
                format!("{}: {}", what, direct_err),
            )),
        },
    }
}

fn collection_entries<T: DeserializeOwned>(value: &Value) -> std::result::Result<Vec<T>, String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| T::deserialize(item).map_err(|e| e.to_string()))
            .collect(),
        Value::Object(map) => map
            .values()
            .map(|item| T::deserialize(item).map_err(|e| e.to_string()))
            .collect(),
        _ => Err("expected an object or an array".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(lengths: &[i32]) -> Vec<Month> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, d)| Month::new(format!("M{}", i + 1), *d))
            .collect()
    }

    #[test]
    fn clean_name_keeps_text_after_last_dot() {
        assert_eq!(clean_name("CALENDARIA.Harptos.Month.Hammer"), "Hammer");
        assert_eq!(clean_name("Plain"), "Plain");
        assert_eq!(clean_name("  Spaced  "), "Spaced");
    }

    #[test]
    fn normalize_color_defaults_and_prefixes() {
        assert_eq!(normalize_color(None), "#808080");
        assert_eq!(normalize_color(Some("   ")), "#808080");
        assert_eq!(normalize_color(Some("ff0000")), "#ff0000");
        assert_eq!(normalize_color(Some(" #00ff00 ")), "#00ff00");
    }

    #[test]
    fn leap_extra_never_negative() {
        assert_eq!(leap_extra(Some(31), 30), 1);
        assert_eq!(leap_extra(Some(0), 30), 0);
        assert_eq!(leap_extra(None, 30), 0);
    }

    #[test]
    fn leap_extra_saturates_on_extreme_totals() {
        assert_eq!(leap_extra(Some(i32::MIN), 30), 0);
        assert_eq!(leap_extra(Some(i32::MAX), -5), i32::MAX);
    }

    #[test]
    fn season_start_outside_calendar_is_a_decode_error() {
        let m = months(&[30, 30]);
        assert!(check_season_start("Test", &m, "Spring", 2, 30).is_ok());
        for (month, day) in [(0, 1), (3, 1), (1, 0), (1, 31), (u32::MAX, 1), (1, u32::MAX)] {
            let err = check_season_start("Test", &m, "Spring", month, day).unwrap_err();
            assert!(matches!(err, CalendarError::Decode { format: "Test", .. }), "{month}/{day}");
        }
    }

    #[test]
    fn day_before_crosses_month_and_year() {
        let m = months(&[31, 28, 31]);
        assert_eq!(day_before(&m, 2, 10), (2, 9));
        assert_eq!(day_before(&m, 3, 1), (2, 28));
        assert_eq!(day_before(&m, 1, 1), (3, 31));
    }

    #[test]
    fn day_of_year_search_is_cumulative() {
        let m = months(&[31, 28, 31]);
        assert_eq!(date_from_day_of_year(&m, 1), (1, 1));
        assert_eq!(date_from_day_of_year(&m, 31), (1, 31));
        assert_eq!(date_from_day_of_year(&m, 32), (2, 1));
        assert_eq!(date_from_day_of_year(&m, 90), (3, 31));
        assert_eq!(date_from_day_of_year(&m, 500), (3, 31));
    }

    #[test]
    fn keyed_entries_falls_back_to_values_wrapper() {
        #[derive(serde::Deserialize)]
        struct Named {
            name: String,
        }
        let direct = serde_json::json!({"a": {"name": "A"}, "b": {"name": "B"}});
        let wrapped = serde_json::json!({"values": {"a": {"name": "A"}}});
        let listed = serde_json::json!([{"name": "X"}]);

        let d: Vec<Named> = keyed_entries("Test", "things", &direct).unwrap();
        let w: Vec<Named> = keyed_entries("Test", "things", &wrapped).unwrap();
        let l: Vec<Named> = keyed_entries("Test", "things", &listed).unwrap();

        assert_eq!(d.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(w[0].name, "A");
        assert_eq!(l[0].name, "X");
    }
}
