//! Calendar service -- validation, arithmetic and persistence composed into commands.
//!
//! The service holds no state beyond its repository and limits. Mutating
//! commands follow load → compute → persist; callers that share a repository
//! across requests rely on it for row-level mutual exclusion.

use chrono::Utc;
use tracing::{debug, info};

use crate::advance;
use crate::config::Limits;
use crate::error::{CalendarError, Result};
use crate::event::{DateKey, Event, EventInput, ROLE_OWNER};
use crate::export::{export_calendar, ChronicleDocument};
use crate::import::{normalize_color, parse_import, ImportResult};
use crate::model::{
    Calendar, CalendarMode, CurrentDate, DateSnapshot, Era, Month, Moon, Season, Weekday,
    MAX_MONTH_DAYS,
};
use crate::repository::CalendarRepository;

/// Parameters for [`CalendarService::create_calendar`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCalendar {
    pub campaign_id: String,
    pub name: String,
    pub mode: CalendarMode,
    pub description: Option<String>,
    pub epoch_name: Option<String>,
    pub current_year: i64,
    pub hours_per_day: u32,
    pub minutes_per_hour: u32,
    pub seconds_per_minute: u32,
    pub leap_year_every: i32,
    pub leap_year_offset: i32,
}

impl NewCalendar {
    /// A fantasy calendar starting in year 1 with 24h/60m/60s and no leap years.
    pub fn fantasy(campaign_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            name: name.into(),
            mode: CalendarMode::Fantasy,
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

    /// A Gregorian-shaped calendar seeded with today's date.
    pub fn real_life(campaign_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: CalendarMode::RealLife,
            ..Self::fantasy(campaign_id, name)
        }
    }
}

/// Calendar-level settings accepted by [`CalendarService::update_settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    pub name: String,
    pub description: Option<String>,
    pub epoch_name: Option<String>,
    pub hours_per_day: u32,
    pub minutes_per_hour: u32,
    pub seconds_per_minute: u32,
    pub leap_year_every: i32,
    pub leap_year_offset: i32,
}

pub struct CalendarService<R> {
    repo: R,
    limits: Limits,
}

impl<R: CalendarRepository> CalendarService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_limits(repo, Limits::default())
    }

    pub fn with_limits(repo: R, limits: Limits) -> Self {
        Self { repo, limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    // -----------------------------------------------------------------------
    // Calendars
    // -----------------------------------------------------------------------

    /// Create the campaign's calendar.
    ///
    /// The one-calendar-per-campaign rule is a lookup before insert, not a
    /// storage constraint.
    pub fn create_calendar(&mut self, input: NewCalendar) -> Result<Calendar> {
        if input.name.trim().is_empty() {
            return Err(CalendarError::validation("calendar name is required"));
        }
        validate_time_units(input.hours_per_day, input.minutes_per_hour, input.seconds_per_minute)?;
        validate_leap_rule(input.leap_year_every)?;
        if self
            .repo
            .get_calendar_by_campaign(&input.campaign_id)?
            .is_some()
        {
            return Err(CalendarError::AlreadyExists(input.campaign_id));
        }

        let name = input.name.trim().to_string();
        let mut calendar = match input.mode {
            CalendarMode::RealLife => {
                Calendar::real_life("", &input.campaign_id, name, Utc::now().date_naive())
            }
            CalendarMode::Fantasy => {
                let mut calendar = Calendar::new("", &input.campaign_id, name);
                calendar.current = CurrentDate::start_of_year(input.current_year);
                calendar.leap_year_every = input.leap_year_every;
                calendar.leap_year_offset = input.leap_year_offset;
                calendar
            }
        };
        calendar.description = input.description;
        if input.epoch_name.is_some() {
            calendar.epoch_name = input.epoch_name;
        }
        calendar.hours_per_day = input.hours_per_day;
        calendar.minutes_per_hour = input.minutes_per_hour;
        calendar.seconds_per_minute = input.seconds_per_minute;

        let calendar = self.repo.insert_calendar(calendar)?;
        info!(calendar_id = %calendar.id, campaign_id = %calendar.campaign_id, mode = ?calendar.mode, "created calendar");
        Ok(calendar)
    }

    pub fn get_calendar(&self, id: &str) -> Result<Calendar> {
        self.repo
            .get_calendar(id)?
            .ok_or_else(|| CalendarError::NotFound(format!("calendar {}", id)))
    }

    pub fn get_calendar_for_campaign(&self, campaign_id: &str) -> Result<Calendar> {
        self.repo
            .get_calendar_by_campaign(campaign_id)?
            .ok_or_else(|| CalendarError::NotFound(format!("calendar for campaign {}", campaign_id)))
    }

    pub fn update_settings(&mut self, id: &str, settings: CalendarSettings) -> Result<Calendar> {
        if settings.name.trim().is_empty() {
            return Err(CalendarError::validation("calendar name is required"));
        }
        validate_time_units(
            settings.hours_per_day,
            settings.minutes_per_hour,
            settings.seconds_per_minute,
        )?;
        validate_leap_rule(settings.leap_year_every)?;

        let mut calendar = self.get_calendar(id)?;
        calendar.name = settings.name.trim().to_string();
        calendar.description = settings.description;
        calendar.epoch_name = settings.epoch_name;
        calendar.hours_per_day = settings.hours_per_day;
        calendar.minutes_per_hour = settings.minutes_per_hour;
        calendar.seconds_per_minute = settings.seconds_per_minute;
        calendar.leap_year_every = settings.leap_year_every;
        calendar.leap_year_offset = settings.leap_year_offset;
        self.repo.update_settings(&calendar)?;
        info!(calendar_id = %id, "updated calendar settings");
        Ok(calendar)
    }

    pub fn delete_calendar(&mut self, id: &str) -> Result<()> {
        self.get_calendar(id)?;
        self.repo.delete_calendar(id)?;
        info!(calendar_id = %id, "deleted calendar");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sub-resources (wholesale replacement)
    // -----------------------------------------------------------------------

    pub fn set_months(&mut self, id: &str, months: Vec<Month>) -> Result<Vec<Month>> {
        let months = prepare_months(months)?;
        self.get_calendar(id)?;
        self.repo.replace_months(id, &months)?;
        info!(calendar_id = %id, count = months.len(), "replaced months");
        Ok(months)
    }

    pub fn set_weekdays(&mut self, id: &str, weekdays: Vec<Weekday>) -> Result<Vec<Weekday>> {
        let weekdays = prepare_weekdays(weekdays)?;
        self.get_calendar(id)?;
        self.repo.replace_weekdays(id, &weekdays)?;
        info!(calendar_id = %id, count = weekdays.len(), "replaced weekdays");
        Ok(weekdays)
    }

    pub fn set_moons(&mut self, id: &str, moons: Vec<Moon>) -> Result<Vec<Moon>> {
        let moons = prepare_moons(moons)?;
        self.get_calendar(id)?;
        self.repo.replace_moons(id, &moons)?;
        info!(calendar_id = %id, count = moons.len(), "replaced moons");
        Ok(moons)
    }

    /// Seasons are checked against the calendar's current months.
    pub fn set_seasons(&mut self, id: &str, seasons: Vec<Season>) -> Result<Vec<Season>> {
        let calendar = self.get_calendar(id)?;
        let seasons = prepare_seasons(seasons, &calendar.months)?;
        self.repo.replace_seasons(id, &seasons)?;
        info!(calendar_id = %id, count = seasons.len(), "replaced seasons");
        Ok(seasons)
    }

    pub fn set_eras(&mut self, id: &str, eras: Vec<Era>) -> Result<Vec<Era>> {
        let eras = prepare_eras(eras)?;
        self.get_calendar(id)?;
        self.repo.replace_eras(id, &eras)?;
        info!(calendar_id = %id, count = eras.len(), "replaced eras");
        Ok(eras)
    }

    // -----------------------------------------------------------------------
    // Date and time
    // -----------------------------------------------------------------------

    /// Advance the current date by `days` within `[1, max_advance_days]`.
    pub fn advance_date(&mut self, id: &str, days: u64) -> Result<CurrentDate> {
        let max = self.limits.max_advance_days();
        if days == 0 || days > max {
            return Err(CalendarError::validation(format!(
                "days must be between 1 and {}",
                max
            )));
        }
        let mut calendar = self.get_calendar(id)?;
        advance::advance_date(&mut calendar, days)?;
        self.repo.update_current_date(id, calendar.current)?;
        info!(calendar_id = %id, days, "advanced date");
        Ok(calendar.current)
    }

    /// Advance the clock; hours within `[0, max_advance_hours]`, not both zero.
    pub fn advance_time(&mut self, id: &str, hours: u64, minutes: u64) -> Result<CurrentDate> {
        let max = self.limits.max_advance_hours();
        if hours > max {
            return Err(CalendarError::validation(format!(
                "hours must be between 0 and {}",
                max
            )));
        }
        let mut calendar = self.get_calendar(id)?;
        advance::advance_time(&mut calendar, hours, minutes)?;
        self.repo.update_current_date(id, calendar.current)?;
        info!(calendar_id = %id, hours, minutes, "advanced time");
        Ok(calendar.current)
    }

    pub fn current_snapshot(&self, id: &str) -> Result<DateSnapshot> {
        Ok(self.get_calendar(id)?.current_snapshot())
    }

    // -----------------------------------------------------------------------
    // Import / export
    // -----------------------------------------------------------------------

    /// Detect, parse and apply a foreign calendar file to calendar `id`.
    pub fn import_bytes(&mut self, id: &str, bytes: &[u8]) -> Result<Calendar> {
        let max = self.limits.max_import_bytes();
        if bytes.len() > max {
            return Err(CalendarError::validation(format!(
                "import payload of {} bytes exceeds the {} byte limit",
                bytes.len(),
                max
            )));
        }
        let result = parse_import(bytes)?;
        self.apply_import(id, result)
    }

    /// Replace settings and every sub-resource of calendar `id` with an import.
    ///
    /// The current date resets to the first day of the imported year and the
    /// calendar's events are replaced by the imported ones. The new calendar and
    /// its events are validated and assembled in memory, then written through a
    /// single [`CalendarRepository::replace_calendar`] call, so a failure leaves
    /// the stored calendar and its events untouched.
    pub fn apply_import(&mut self, id: &str, import: ImportResult) -> Result<Calendar> {
        let mut calendar = self.get_calendar(id)?;
        let settings = import.settings;
        validate_time_units(
            settings.hours_per_day,
            settings.minutes_per_hour,
            settings.seconds_per_minute,
        )?;
        validate_leap_rule(settings.leap_year_every)?;

        let months = prepare_months(import.months)?;
        calendar.seasons = prepare_seasons(import.seasons, &months)?;
        calendar.months = months;
        calendar.weekdays = prepare_weekdays(import.weekdays)?;
        calendar.moons = prepare_moons(import.moons)?;
        calendar.eras = prepare_eras(import.eras)?;

        if !import.calendar_name.trim().is_empty() {
            calendar.name = import.calendar_name.trim().to_string();
        }
        if let Some(mode) = settings.mode {
            calendar.mode = mode;
        }
        calendar.description = settings.description;
        calendar.epoch_name = settings.epoch_name;
        calendar.hours_per_day = settings.hours_per_day;
        calendar.minutes_per_hour = settings.minutes_per_hour;
        calendar.seconds_per_minute = settings.seconds_per_minute;
        calendar.leap_year_every = settings.leap_year_every;
        calendar.leap_year_offset = settings.leap_year_offset;
        calendar.current = CurrentDate::start_of_year(settings.current_year);

        let events = import
            .events
            .into_iter()
            .map(|input| input.into_event("", &calendar))
            .collect::<Result<Vec<Event>>>()?;

        let events = self.repo.replace_calendar(&calendar, &events)?;

        info!(
            calendar_id = %id,
            format = %import.format,
            months = calendar.months.len(),
            weekdays = calendar.weekdays.len(),
            moons = calendar.moons.len(),
            seasons = calendar.seasons.len(),
            eras = calendar.eras.len(),
            events = events.len(),
            "applied import"
        );
        Ok(calendar)
    }

    /// Canonical export; events are included only when asked for and filtered by `role`.
    pub fn export(&self, id: &str, include_events: bool, role: i32) -> Result<ChronicleDocument> {
        let calendar = self.get_calendar(id)?;
        let events = if include_events {
            Some(
                self.repo
                    .list_events_in_range(id, DateKey::MIN, DateKey::MAX, role)?,
            )
        } else {
            None
        };
        Ok(export_calendar(&calendar, events.as_deref()))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn create_event(&mut self, calendar_id: &str, input: EventInput) -> Result<Event> {
        let calendar = self.get_calendar(calendar_id)?;
        let event = input.into_event("", &calendar)?;
        let event = self.repo.insert_event(event)?;
        debug!(calendar_id, event_id = %event.id, "created event");
        Ok(event)
    }

    /// Fetch an event, hiding `dm_only` events from members below owner.
    pub fn get_event(&self, id: &str, role: i32) -> Result<Event> {
        self.repo
            .get_event(id)?
            .filter(|e| e.visibility.visible_to(role))
            .ok_or_else(|| CalendarError::NotFound(format!("event {}", id)))
    }

    pub fn update_event(&mut self, id: &str, input: EventInput) -> Result<Event> {
        let existing = self.get_event(id, ROLE_OWNER)?;
        let calendar = self.get_calendar(&existing.calendar_id)?;
        let event = input.into_event(id, &calendar)?;
        self.repo.update_event(&event)?;
        debug!(event_id = %id, "updated event");
        Ok(event)
    }

    pub fn delete_event(&mut self, id: &str) -> Result<()> {
        self.get_event(id, ROLE_OWNER)?;
        self.repo.delete_event(id)?;
        debug!(event_id = %id, "deleted event");
        Ok(())
    }

    pub fn list_events_for_month(
        &self,
        calendar_id: &str,
        year: i64,
        month: u32,
        role: i32,
    ) -> Result<Vec<Event>> {
        let calendar = self.get_calendar(calendar_id)?;
        if month == 0 || month as usize > calendar.months.len() {
            return Err(CalendarError::validation(format!(
                "month {} is outside 1..={}",
                month,
                calendar.months.len()
            )));
        }
        Ok(self
            .repo
            .list_events_for_month(calendar_id, year, month, role)?)
    }

    /// The next `limit` non-recurring events on or after the current date.
    pub fn upcoming_events(&self, calendar_id: &str, limit: usize, role: i32) -> Result<Vec<Event>> {
        let calendar = self.get_calendar(calendar_id)?;
        let today = DateKey::new(calendar.current.year, calendar.current.month, calendar.current.day);
        let mut events = self
            .repo
            .list_events_in_range(calendar_id, today, DateKey::MAX, role)?;
        events.retain(|e| e.recurrence.is_none());
        events.truncate(limit);
        Ok(events)
    }
}

fn validate_time_units(hours_per_day: u32, minutes_per_hour: u32, seconds_per_minute: u32) -> Result<()> {
    if hours_per_day == 0 || minutes_per_hour == 0 || seconds_per_minute == 0 {
        return Err(CalendarError::validation(
            "hours_per_day, minutes_per_hour and seconds_per_minute must be positive",
        ));
    }
    Ok(())
}

fn validate_leap_rule(leap_year_every: i32) -> Result<()> {
    if leap_year_every < 0 {
        return Err(CalendarError::validation("leap_year_every must not be negative"));
    }
    Ok(())
}

fn require_name(kind: &str, index: usize, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CalendarError::validation(format!(
            "{} {} needs a name",
            kind,
            index + 1
        )));
    }
    Ok(name.to_string())
}

/// Validate months and renumber `sort_order` by position.
pub fn prepare_months(months: Vec<Month>) -> Result<Vec<Month>> {
    if months.is_empty() {
        return Err(CalendarError::validation("a calendar needs at least one month"));
    }
    months
        .into_iter()
        .enumerate()
        .map(|(i, month)| {
            let name = require_name("month", i, &month.name)?;
            if month.days < 1 || month.days > MAX_MONTH_DAYS {
                return Err(CalendarError::validation(format!(
                    "month '{}' has {} days, expected 1..={}",
                    name, month.days, MAX_MONTH_DAYS
                )));
            }
            if month.leap_year_days < 0 || month.leap_year_days > MAX_MONTH_DAYS {
                return Err(CalendarError::validation(format!(
                    "month '{}' has {} leap days, expected 0..={}",
                    name, month.leap_year_days, MAX_MONTH_DAYS
                )));
            }
            Ok(Month {
                name,
                sort_order: i as u32,
                ..month
            })
        })
        .collect()
}

pub fn prepare_weekdays(weekdays: Vec<Weekday>) -> Result<Vec<Weekday>> {
    weekdays
        .into_iter()
        .enumerate()
        .map(|(i, weekday)| {
            Ok(Weekday {
                name: require_name("weekday", i, &weekday.name)?,
                sort_order: i as u32,
            })
        })
        .collect()
}

pub fn prepare_moons(moons: Vec<Moon>) -> Result<Vec<Moon>> {
    moons
        .into_iter()
        .enumerate()
        .map(|(i, moon)| {
            let name = require_name("moon", i, &moon.name)?;
            if !moon.cycle_days.is_finite() || moon.cycle_days <= 0.0 {
                return Err(CalendarError::validation(format!(
                    "moon '{}' needs a positive cycle length",
                    name
                )));
            }
            if !moon.phase_offset.is_finite() {
                return Err(CalendarError::validation(format!(
                    "moon '{}' has a non-finite phase offset",
                    name
                )));
            }
            Ok(Moon {
                name,
                color: normalize_color(Some(moon.color.as_str())),
                ..moon
            })
        })
        .collect()
}

/// Seasons must point at existing months and days that exist in a leap year.
pub fn prepare_seasons(seasons: Vec<Season>, months: &[Month]) -> Result<Vec<Season>> {
    let check = |name: &str, which: &str, month: u32, day: u32| -> Result<()> {
        let longest = month
            .checked_sub(1)
            .and_then(|idx| months.get(idx as usize))
            .map(|m| i64::from(m.days) + i64::from(m.leap_year_days));
        match longest {
            Some(len) if day >= 1 && i64::from(day) <= len => Ok(()),
            Some(len) => Err(CalendarError::validation(format!(
                "season '{}' {} day {} is outside 1..={}",
                name, which, day, len
            ))),
            None => Err(CalendarError::validation(format!(
                "season '{}' {} month {} is outside 1..={}",
                name,
                which,
                month,
                months.len()
            ))),
        }
    };

    seasons
        .into_iter()
        .enumerate()
        .map(|(i, season)| {
            let name = require_name("season", i, &season.name)?;
            check(&name, "start", season.start_month, season.start_day)?;
            check(&name, "end", season.end_month, season.end_day)?;
            Ok(Season {
                name,
                color: normalize_color(Some(season.color.as_str())),
                ..season
            })
        })
        .collect()
}

pub fn prepare_eras(eras: Vec<Era>) -> Result<Vec<Era>> {
    eras.into_iter()
        .enumerate()
        .map(|(i, era)| {
            let name = require_name("era", i, &era.name)?;
            if era.end_year.is_some_and(|end| end < era.start_year) {
                return Err(CalendarError::validation(format!(
                    "era '{}' ends before it starts",
                    name
                )));
            }
            Ok(Era {
                name,
                color: normalize_color(Some(era.color.as_str())),
                sort_order: i as u32,
                ..era
            })
        })
        .collect()
}
