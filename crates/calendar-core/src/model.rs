//! Calendar model -- in-memory representation plus pure arithmetic.
//!
//! Everything here is deterministic and side-effect free: leap-year tests,
//! month and year lengths, the absolute-day counter used for weekday and moon
//! cycling, season membership and era lookup.
//!
//! # Absolute days
//!
//! [`Calendar::absolute_day`] multiplies the year by the *base* year length and
//! ignores leap days accumulated in earlier years. Stored campaign data relies on
//! the resulting weekday alignment, so the approximation is kept as-is.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fallback colour for moons, seasons and eras that do not specify one.
pub const DEFAULT_COLOR: &str = "#808080";

/// Upper bound on a single month's base length.
pub const MAX_MONTH_DAYS: i32 = 400;

/// Whether a calendar is an invented world calendar or tracks the real one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalendarMode {
    #[default]
    #[serde(rename = "fantasy")]
    Fantasy,
    #[serde(rename = "reallife", alias = "real-life", alias = "real_life")]
    RealLife,
}

/// The in-world "now". Month and day are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentDate {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CurrentDate {
    /// Midnight on the first day of the first month of `year`.
    pub fn start_of_year(year: i64) -> Self {
        Self {
            year,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Month {
    pub name: String,
    /// Base length in a common year.
    pub days: i32,
    /// Extra days added in a leap year (not a total).
    #[serde(default)]
    pub leap_year_days: i32,
    #[serde(default)]
    pub sort_order: u32,
    #[serde(default)]
    pub is_intercalary: bool,
}

impl Month {
    pub fn new(name: impl Into<String>, days: i32) -> Self {
        Self {
            name: name.into(),
            days,
            leap_year_days: 0,
            sort_order: 0,
            is_intercalary: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weekday {
    pub name: String,
    #[serde(default)]
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moon {
    pub name: String,
    pub cycle_days: f64,
    #[serde(default)]
    pub phase_offset: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

/// The eight named bands of a lunar cycle, each 0.125 of the cycle wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoonPhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhaseName {
    const BANDS: [MoonPhaseName; 8] = [
        MoonPhaseName::NewMoon,
        MoonPhaseName::WaxingCrescent,
        MoonPhaseName::FirstQuarter,
        MoonPhaseName::WaxingGibbous,
        MoonPhaseName::FullMoon,
        MoonPhaseName::WaningGibbous,
        MoonPhaseName::LastQuarter,
        MoonPhaseName::WaningCrescent,
    ];

    /// Classify a phase fraction in `[0, 1)`.
    pub fn from_fraction(phase: f64) -> Self {
        let band = (phase.rem_euclid(1.0) / 0.125).floor() as usize;
        Self::BANDS[band.min(7)]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "New Moon",
            MoonPhaseName::WaxingCrescent => "Waxing Crescent",
            MoonPhaseName::FirstQuarter => "First Quarter",
            MoonPhaseName::WaxingGibbous => "Waxing Gibbous",
            MoonPhaseName::FullMoon => "Full Moon",
            MoonPhaseName::WaningGibbous => "Waning Gibbous",
            MoonPhaseName::LastQuarter => "Last Quarter",
            MoonPhaseName::WaningCrescent => "Waning Crescent",
        }
    }
}

impl std::fmt::Display for MoonPhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Moon {
    /// Position in the cycle for an absolute day, in `[0, 1)`.
    ///
    /// A non-positive cycle length has no meaningful phase and reads as new moon.
    pub fn phase(&self, absolute_day: i64) -> f64 {
        if self.cycle_days <= 0.0 || !self.cycle_days.is_finite() {
            return 0.0;
        }
        let phase = ((absolute_day as f64 + self.phase_offset) / self.cycle_days).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
        if phase >= 1.0 {
            0.0
        } else {
            phase
        }
    }

    pub fn phase_name(&self, absolute_day: i64) -> MoonPhaseName {
        MoonPhaseName::from_fraction(self.phase(absolute_day))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub name: String,
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_effect: Option<String>,
}

impl Season {
    /// Whether the 1-based `month`/`day` falls inside this season.
    ///
    /// Seasons whose start ordinal is after their end ordinal wrap over the
    /// year boundary (e.g. winter running from month 11 to month 2).
    pub fn contains_date(&self, month: u32, day: u32) -> bool {
        let date = ordinal(month, day);
        let start = ordinal(self.start_month, self.start_day);
        let end = ordinal(self.end_month, self.end_day);
        if start <= end {
            date >= start && date <= end
        } else {
            date >= start || date <= end
        }
    }
}

fn ordinal(month: u32, day: u32) -> u64 {
    month as u64 * 100 + day as u64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Era {
    pub name: String,
    pub start_year: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub sort_order: u32,
}

impl Era {
    pub fn contains_year(&self, year: i64) -> bool {
        year >= self.start_year && self.end_year.is_none_or(|end| year <= end)
    }
}

pub(crate) fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A fully hydrated calendar: settings, current date and every sub-resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    pub id: String,
    pub campaign_id: String,
    pub mode: CalendarMode,
    pub name: String,
    pub description: Option<String>,
    pub epoch_name: Option<String>,
    pub current: CurrentDate,
    pub hours_per_day: u32,
    pub minutes_per_hour: u32,
    pub seconds_per_minute: u32,
    /// Leap year period in years; zero or negative disables leap years.
    pub leap_year_every: i32,
    pub leap_year_offset: i32,
    pub months: Vec<Month>,
    pub weekdays: Vec<Weekday>,
    pub moons: Vec<Moon>,
    pub seasons: Vec<Season>,
    pub eras: Vec<Era>,
}

impl Calendar {
    /// An empty fantasy calendar with 24h/60m/60s time units and no leap years.
    pub fn new(
        id: impl Into<String>,
        campaign_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            campaign_id: campaign_id.into(),
            mode: CalendarMode::Fantasy,
            name: name.into(),
            description: None,
            epoch_name: None,
            current: CurrentDate::start_of_year(1),
            hours_per_day: 24,
            minutes_per_hour: 60,
            seconds_per_minute: 60,
            leap_year_every: 0,
            leap_year_offset: 0,
            months: Vec::new(),
            weekdays: Vec::new(),
            moons: Vec::new(),
            seasons: Vec::new(),
            eras: Vec::new(),
        }
    }

    /// A Gregorian-shaped calendar whose current date is `today`.
    ///
    /// February carries the single leap day and leap years repeat every four
    /// years; the century exceptions are not representable.
    pub fn real_life(
        id: impl Into<String>,
        campaign_id: impl Into<String>,
        name: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        const MONTHS: [(&str, i32); 12] = [
            ("January", 31),
            ("February", 28),
            ("March", 31),
            ("April", 30),
            ("May", 31),
            ("June", 30),
            ("July", 31),
            ("August", 31),
            ("September", 30),
            ("October", 31),
            ("November", 30),
            ("December", 31),
        ];
        const WEEKDAYS: [&str; 7] = [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ];

        let mut calendar = Self::new(id, campaign_id, name);
        calendar.mode = CalendarMode::RealLife;
        calendar.epoch_name = Some("AD".to_string());
        calendar.leap_year_every = 4;
        calendar.months = MONTHS
            .iter()
            .enumerate()
            .map(|(i, (name, days))| Month {
                name: name.to_string(),
                days: *days,
                leap_year_days: if i == 1 { 1 } else { 0 },
                sort_order: i as u32,
                is_intercalary: false,
            })
            .collect();
        calendar.weekdays = WEEKDAYS
            .iter()
            .enumerate()
            .map(|(i, name)| Weekday {
                name: name.to_string(),
                sort_order: i as u32,
            })
            .collect();
        calendar.current = CurrentDate {
            year: today.year() as i64,
            month: today.month(),
            day: today.day(),
            hour: 0,
            minute: 0,
        };
        calendar
    }

    pub fn is_leap_year(&self, year: i64) -> bool {
        if self.leap_year_every <= 0 {
            return false;
        }
        (i128::from(year) - i128::from(self.leap_year_offset))
            .rem_euclid(i128::from(self.leap_year_every))
            == 0
    }

    /// Sum of base month lengths, ignoring leap days.
    pub fn year_length(&self) -> i64 {
        self.months.iter().map(|m| m.days as i64).sum()
    }

    /// Exact length of `year`, including leap days when it is a leap year.
    pub fn year_length_for_year(&self, year: i64) -> i64 {
        let leap = self.is_leap_year(year);
        self.months
            .iter()
            .map(|m| {
                let extra = if leap { m.leap_year_days as i64 } else { 0 };
                m.days as i64 + extra
            })
            .sum()
    }

    /// Length of the month at 0-based `month_idx` in `year`; 0 when out of range.
    pub fn month_days(&self, month_idx: usize, year: i64) -> i32 {
        match self.months.get(month_idx) {
            Some(month) if self.is_leap_year(year) => {
                month.days.saturating_add(month.leap_year_days)
            }
            Some(month) => month.days,
            None => 0,
        }
    }

    pub fn week_length(&self) -> usize {
        self.weekdays.len()
    }

    /// Continuous day counter used for weekday and moon cycling.
    ///
    /// `month` is 1-based. Leap days of elapsed years are not counted.
    pub fn absolute_day(&self, year: i64, month: u32, day: u32) -> i64 {
        let before: i64 = self
            .months
            .iter()
            .take(month.saturating_sub(1) as usize)
            .map(|m| m.days as i64)
            .sum();
        year.saturating_mul(self.year_length())
            .saturating_add(before)
            .saturating_add(day as i64)
    }

    /// Index into [`Calendar::weekdays`] for an absolute day, or `None` without weekdays.
    pub fn weekday_index(&self, absolute_day: i64) -> Option<usize> {
        let len = self.week_length() as i64;
        if len == 0 {
            return None;
        }
        Some(absolute_day.rem_euclid(len) as usize)
    }

    pub fn weekday_for_date(&self, year: i64, month: u32, day: u32) -> Option<&Weekday> {
        self.weekday_index(self.absolute_day(year, month, day))
            .and_then(|idx| self.weekdays.get(idx))
    }

    /// The first season containing the 1-based date, in list order.
    pub fn season_for_date(&self, month: u32, day: u32) -> Option<&Season> {
        self.seasons.iter().find(|s| s.contains_date(month, day))
    }

    /// The latest-starting era that contains `year`.
    pub fn era_for_year(&self, year: i64) -> Option<&Era> {
        self.eras
            .iter()
            .filter(|era| era.contains_year(year))
            .max_by_key(|era| era.start_year)
    }

    /// `"{day} {month} {year} {epoch}"`, e.g. `"3 Mirtul 1492 DR"`.
    pub fn format_date(&self, year: i64, month: u32, day: u32) -> String {
        let month_name = month
            .checked_sub(1)
            .and_then(|idx| self.months.get(idx as usize))
            .map(|m| m.name.as_str())
            .unwrap_or("?");
        match self.epoch_name.as_deref().filter(|e| !e.is_empty()) {
            Some(epoch) => format!("{} {} {} {}", day, month_name, year, epoch),
            None => format!("{} {} {}", day, month_name, year),
        }
    }

    /// Everything a "today" view needs about the current date.
    pub fn current_snapshot(&self) -> DateSnapshot {
        let CurrentDate {
            year,
            month,
            day,
            hour,
            minute,
        } = self.current;
        let absolute_day = self.absolute_day(year, month, day);

        DateSnapshot {
            formatted: self.format_date(year, month, day),
            time: format!("{:02}:{:02}", hour, minute),
            absolute_day,
            is_leap_year: self.is_leap_year(year),
            weekday: self.weekday_for_date(year, month, day).map(|w| w.name.clone()),
            season: self.season_for_date(month, day).map(|s| s.name.clone()),
            era: self.era_for_year(year).map(|e| e.name.clone()),
            moons: self
                .moons
                .iter()
                .map(|moon| {
                    let phase = moon.phase(absolute_day);
                    MoonReading {
                        name: moon.name.clone(),
                        phase,
                        phase_name: MoonPhaseName::from_fraction(phase),
                    }
                })
                .collect(),
        }
    }
}

/// Derived view of a calendar's current date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateSnapshot {
    pub formatted: String,
    pub time: String,
    pub absolute_day: i64,
    pub is_leap_year: bool,
    pub weekday: Option<String>,
    pub season: Option<String>,
    pub era: Option<String>,
    pub moons: Vec<MoonReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoonReading {
    pub name: String,
    pub phase: f64,
    pub phase_name: MoonPhaseName,
}
