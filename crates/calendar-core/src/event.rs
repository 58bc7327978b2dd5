//! Calendar events -- dated notes attached to a calendar, optionally recurring.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};
use crate::model::Calendar;

/// Campaign role that may see `dm_only` events.
pub const ROLE_OWNER: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    #[serde(rename = "everyone")]
    Everyone,
    #[serde(rename = "dm_only")]
    DmOnly,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Everyone => "everyone",
            Visibility::DmOnly => "dm_only",
        }
    }

    /// Whether a member holding `role` may see an event with this visibility.
    pub fn visible_to(&self, role: i32) -> bool {
        match self {
            Visibility::Everyone => true,
            Visibility::DmOnly => role >= ROLE_OWNER,
        }
    }
}

impl FromStr for Visibility {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "everyone" => Ok(Visibility::Everyone),
            "dm_only" => Ok(Visibility::DmOnly),
            other => Err(CalendarError::validation(format!(
                "unrecognized visibility '{}': expected 'everyone' or 'dm_only'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Yearly,
    Monthly,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::Yearly => "yearly",
            RecurrenceType::Monthly => "monthly",
        }
    }
}

impl FromStr for RecurrenceType {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "yearly" => Ok(RecurrenceType::Yearly),
            "monthly" => Ok(RecurrenceType::Monthly),
            other => Err(CalendarError::validation(format!(
                "unrecognized recurrence type '{}': expected 'yearly' or 'monthly'",
                other
            ))),
        }
    }
}

/// A calendar position used for ordering and range queries. Month and day are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    pub year: i64,
    pub month: u32,
    pub day: u32,
}

impl DateKey {
    pub const MIN: DateKey = DateKey {
        year: i64::MIN,
        month: 0,
        day: 0,
    };
    pub const MAX: DateKey = DateKey {
        year: i64::MAX,
        month: u32::MAX,
        day: u32::MAX,
    };

    pub fn new(year: i64, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

/// Event fields as supplied by a caller or carried in an export file.
///
/// Visibility and recurrence stay strings here; [`EventInput::into_event`]
/// validates them against the owning calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub year: i64,
    pub month: u32,
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_minute: Option<u32>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<String>,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn default_visibility() -> String {
    Visibility::Everyone.as_str().to_string()
}

impl EventInput {
    /// A single-day, non-recurring, public event.
    pub fn on(name: impl Into<String>, year: i64, month: u32, day: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            entity_id: None,
            year,
            month,
            day,
            start_hour: None,
            start_minute: None,
            end_year: None,
            end_month: None,
            end_day: None,
            end_hour: None,
            end_minute: None,
            is_recurring: false,
            recurrence_type: None,
            visibility: default_visibility(),
            category: None,
            color: None,
        }
    }

    /// Validate against `calendar` and produce a stored event.
    ///
    /// # Errors
    /// Returns `CalendarError::Validation` for an empty name, unknown visibility or
    /// recurrence type, a date outside the calendar, a partial end date, an end
    /// before the start, or a time of day outside the calendar's units.
    pub fn into_event(
        self,
        id: impl Into<String>,
        calendar: &Calendar,
    ) -> Result<Event> {
        if self.name.trim().is_empty() {
            return Err(CalendarError::validation("event name is required"));
        }
        let visibility: Visibility = self.visibility.parse()?;
        let recurrence = if self.is_recurring {
            let kind = self.recurrence_type.as_deref().ok_or_else(|| {
                CalendarError::validation("recurring events need a recurrence type")
            })?;
            Some(kind.parse::<RecurrenceType>()?)
        } else {
            None
        };

        validate_date(calendar, self.year, self.month, self.day, "start")?;
        validate_time(calendar, self.start_hour, self.start_minute)?;

        let end = match (self.end_year, self.end_month, self.end_day) {
            (None, None, None) => None,
            (Some(year), Some(month), Some(day)) => {
                validate_date(calendar, year, month, day, "end")?;
                let end = DateKey::new(year, month, day);
                if end < DateKey::new(self.year, self.month, self.day) {
                    return Err(CalendarError::validation("event ends before it starts"));
                }
                Some(end)
            }
            _ => {
                return Err(CalendarError::validation(
                    "end date needs end_year, end_month and end_day together",
                ))
            }
        };
        validate_time(calendar, self.end_hour, self.end_minute)?;

        Ok(Event {
            id: id.into(),
            calendar_id: calendar.id.clone(),
            entity_id: self.entity_id,
            name: self.name.trim().to_string(),
            description: self.description,
            start: DateKey::new(self.year, self.month, self.day),
            start_hour: self.start_hour,
            start_minute: self.start_minute,
            end,
            end_hour: end.and(self.end_hour),
            end_minute: end.and(self.end_minute),
            recurrence,
            visibility,
            category: self.category,
            color: self.color,
        })
    }
}

fn validate_date(calendar: &Calendar, year: i64, month: u32, day: u32, which: &str) -> Result<()> {
    let month_count = calendar.months.len() as u32;
    if month == 0 || month > month_count {
        return Err(CalendarError::validation(format!(
            "{} month {} is outside 1..={}",
            which, month, month_count
        )));
    }
    let month_len = calendar.month_days(month as usize - 1, year);
    if day == 0 || i64::from(day) > i64::from(month_len) {
        return Err(CalendarError::validation(format!(
            "{} day {} is outside 1..={} for month {}",
            which, day, month_len, month
        )));
    }
    Ok(())
}

fn validate_time(calendar: &Calendar, hour: Option<u32>, minute: Option<u32>) -> Result<()> {
    if hour.is_some_and(|h| h >= calendar.hours_per_day) {
        return Err(CalendarError::validation(format!(
            "hour must be below {}",
            calendar.hours_per_day
        )));
    }
    if minute.is_some_and(|m| m >= calendar.minutes_per_hour) {
        return Err(CalendarError::validation(format!(
            "minute must be below {}",
            calendar.minutes_per_hour
        )));
    }
    Ok(())
}

/// A validated, stored calendar event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub entity_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start: DateKey,
    pub start_hour: Option<u32>,
    pub start_minute: Option<u32>,
    /// Present for multi-day events.
    pub end: Option<DateKey>,
    pub end_hour: Option<u32>,
    pub end_minute: Option<u32>,
    pub recurrence: Option<RecurrenceType>,
    pub visibility: Visibility,
    pub category: Option<String>,
    pub color: Option<String>,
}

impl Event {
    pub fn is_multi_day(&self) -> bool {
        self.end.is_some()
    }

    /// Whether the event has an occurrence touching `year`/`month` (1-based month).
    pub fn occurs_in_month(&self, year: i64, month: u32) -> bool {
        let start = (self.start.year, self.start.month);
        let target = (year, month);
        match self.recurrence {
            Some(RecurrenceType::Yearly) => self.start.month == month && self.start.year <= year,
            Some(RecurrenceType::Monthly) => start <= target,
            None => {
                let end = self
                    .end
                    .map(|e| (e.year, e.month))
                    .unwrap_or(start);
                start <= target && target <= end
            }
        }
    }

    pub fn to_input(&self) -> EventInput {
        EventInput {
            name: self.name.clone(),
            description: self.description.clone(),
            entity_id: self.entity_id.clone(),
            year: self.start.year,
            month: self.start.month,
            day: self.start.day,
            start_hour: self.start_hour,
            start_minute: self.start_minute,
            end_year: self.end.map(|e| e.year),
            end_month: self.end.map(|e| e.month),
            end_day: self.end.map(|e| e.day),
            end_hour: self.end_hour,
            end_minute: self.end_minute,
            is_recurring: self.recurrence.is_some(),
            recurrence_type: self.recurrence.map(|r| r.as_str().to_string()),
            visibility: self.visibility.as_str().to_string(),
            category: self.category.clone(),
            color: self.color.clone(),
        }
    }
}
