//! Persistence boundary.
//!
//! [`CalendarRepository`] is the contract the service drives; production code
//! backs it with a database. Every `replace_*` call and [`CalendarRepository::replace_calendar`]
//! is one atomic unit: an implementation deletes and reinserts the children
//! inside a single transaction so readers never observe a half-replaced list.
//!
//! [`InMemoryRepository`] is a complete implementation for tests and the CLI.

use std::collections::HashMap;

use thiserror::Error;

use crate::event::{DateKey, Event};
use crate::model::{Calendar, CurrentDate, Era, Month, Moon, Season, Weekday};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// A write targeted a row that does not exist.
    #[error("record not found: {0}")]
    Missing(String),

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

/// Storage operations for calendars, their sub-resources and events.
///
/// Ids are assigned by the repository on insert.
pub trait CalendarRepository {
    fn insert_calendar(&mut self, calendar: Calendar) -> RepoResult<Calendar>;
    fn get_calendar(&self, id: &str) -> RepoResult<Option<Calendar>>;
    fn get_calendar_by_campaign(&self, campaign_id: &str) -> RepoResult<Option<Calendar>>;
    /// Write calendar-level settings, leaving the current date and children alone.
    fn update_settings(&mut self, calendar: &Calendar) -> RepoResult<()>;
    fn update_current_date(&mut self, id: &str, current: CurrentDate) -> RepoResult<()>;
    /// Remove a calendar together with its children and events.
    fn delete_calendar(&mut self, id: &str) -> RepoResult<()>;

    fn replace_months(&mut self, calendar_id: &str, months: &[Month]) -> RepoResult<()>;
    fn replace_weekdays(&mut self, calendar_id: &str, weekdays: &[Weekday]) -> RepoResult<()>;
    fn replace_moons(&mut self, calendar_id: &str, moons: &[Moon]) -> RepoResult<()>;
    fn replace_seasons(&mut self, calendar_id: &str, seasons: &[Season]) -> RepoResult<()>;
    fn replace_eras(&mut self, calendar_id: &str, eras: &[Era]) -> RepoResult<()>;

    /// Overwrite settings, current date, every child list and the calendar's
    /// events in one transaction. Returns the inserted events with their ids.
    fn replace_calendar(
        &mut self,
        calendar: &Calendar,
        events: &[Event],
    ) -> RepoResult<Vec<Event>>;

    fn insert_event(&mut self, event: Event) -> RepoResult<Event>;
    fn get_event(&self, id: &str) -> RepoResult<Option<Event>>;
    fn update_event(&mut self, event: &Event) -> RepoResult<()>;
    fn delete_event(&mut self, id: &str) -> RepoResult<()>;

    /// Events starting within `[from, to]`, hiding `dm_only` entries from `role`s below owner.
    fn list_events_in_range(
        &self,
        calendar_id: &str,
        from: DateKey,
        to: DateKey,
        role: i32,
    ) -> RepoResult<Vec<Event>>;

    /// Events with an occurrence in `year`/`month`, recurring ones included.
    fn list_events_for_month(
        &self,
        calendar_id: &str,
        year: i64,
        month: u32,
        role: i32,
    ) -> RepoResult<Vec<Event>>;
}

/// `HashMap`-backed repository.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    calendars: HashMap<String, Calendar>,
    events: HashMap<String, Event>,
    next_id: u64,
    fail_writes: bool,
    fail_event_writes: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `RepositoryError::Storage`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make only event writes fail, including the event half of `replace_calendar`.
    pub fn set_fail_event_writes(&mut self, fail: bool) {
        self.fail_event_writes = fail;
    }

    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.fail_writes {
            return Err(RepositoryError::Storage("writes are disabled".to_string()));
        }
        Ok(())
    }

    fn check_event_writable(&self) -> RepoResult<()> {
        self.check_writable()?;
        if self.fail_event_writes {
            return Err(RepositoryError::Storage("event writes are disabled".to_string()));
        }
        Ok(())
    }

    fn calendar_mut(&mut self, id: &str) -> RepoResult<&mut Calendar> {
        self.check_writable()?;
        self.calendars
            .get_mut(id)
            .ok_or_else(|| RepositoryError::Missing(format!("calendar {}", id)))
    }

    fn sorted(mut events: Vec<Event>) -> Vec<Event> {
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        events
    }
}

impl CalendarRepository for InMemoryRepository {
    fn insert_calendar(&mut self, mut calendar: Calendar) -> RepoResult<Calendar> {
        self.check_writable()?;
        calendar.id = self.allocate_id("cal");
        self.calendars.insert(calendar.id.clone(), calendar.clone());
        Ok(calendar)
    }

    fn get_calendar(&self, id: &str) -> RepoResult<Option<Calendar>> {
        Ok(self.calendars.get(id).cloned())
    }

    fn get_calendar_by_campaign(&self, campaign_id: &str) -> RepoResult<Option<Calendar>> {
        Ok(self
            .calendars
            .values()
            .find(|c| c.campaign_id == campaign_id)
            .cloned())
    }

    fn update_settings(&mut self, calendar: &Calendar) -> RepoResult<()> {
        let stored = self.calendar_mut(&calendar.id)?;
        stored.mode = calendar.mode;
        stored.name = calendar.name.clone();
        stored.description = calendar.description.clone();
        stored.epoch_name = calendar.epoch_name.clone();
        stored.hours_per_day = calendar.hours_per_day;
        stored.minutes_per_hour = calendar.minutes_per_hour;
        stored.seconds_per_minute = calendar.seconds_per_minute;
        stored.leap_year_every = calendar.leap_year_every;
        stored.leap_year_offset = calendar.leap_year_offset;
        Ok(())
    }

    fn update_current_date(&mut self, id: &str, current: CurrentDate) -> RepoResult<()> {
        self.calendar_mut(id)?.current = current;
        Ok(())
    }

    fn delete_calendar(&mut self, id: &str) -> RepoResult<()> {
        self.check_writable()?;
        if self.calendars.remove(id).is_none() {
            return Err(RepositoryError::Missing(format!("calendar {}", id)));
        }
        self.events.retain(|_, e| e.calendar_id != id);
        Ok(())
    }

    fn replace_months(&mut self, calendar_id: &str, months: &[Month]) -> RepoResult<()> {
        self.calendar_mut(calendar_id)?.months = months.to_vec();
        Ok(())
    }

    fn replace_weekdays(&mut self, calendar_id: &str, weekdays: &[Weekday]) -> RepoResult<()> {
        self.calendar_mut(calendar_id)?.weekdays = weekdays.to_vec();
        Ok(())
    }

    fn replace_moons(&mut self, calendar_id: &str, moons: &[Moon]) -> RepoResult<()> {
        self.calendar_mut(calendar_id)?.moons = moons.to_vec();
        Ok(())
    }

    fn replace_seasons(&mut self, calendar_id: &str, seasons: &[Season]) -> RepoResult<()> {
        self.calendar_mut(calendar_id)?.seasons = seasons.to_vec();
        Ok(())
    }

    fn replace_eras(&mut self, calendar_id: &str, eras: &[Era]) -> RepoResult<()> {
        self.calendar_mut(calendar_id)?.eras = eras.to_vec();
        Ok(())
    }

    fn replace_calendar(
        &mut self,
        calendar: &Calendar,
        events: &[Event],
    ) -> RepoResult<Vec<Event>> {
        // Every check runs before the first mutation.
        self.calendar_mut(&calendar.id)?;
        if !events.is_empty() {
            self.check_event_writable()?;
        }

        self.events.retain(|_, e| e.calendar_id != calendar.id);
        let mut inserted = Vec::with_capacity(events.len());
        for event in events {
            let mut event = event.clone();
            event.id = self.allocate_id("evt");
            event.calendar_id = calendar.id.clone();
            self.events.insert(event.id.clone(), event.clone());
            inserted.push(event);
        }
        self.calendars.insert(calendar.id.clone(), calendar.clone());
        Ok(inserted)
    }

    fn insert_event(&mut self, mut event: Event) -> RepoResult<Event> {
        self.check_event_writable()?;
        event.id = self.allocate_id("evt");
        self.events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    fn get_event(&self, id: &str) -> RepoResult<Option<Event>> {
        Ok(self.events.get(id).cloned())
    }

    fn update_event(&mut self, event: &Event) -> RepoResult<()> {
        self.check_event_writable()?;
        match self.events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(())
            }
            None => Err(RepositoryError::Missing(format!("event {}", event.id))),
        }
    }

    fn delete_event(&mut self, id: &str) -> RepoResult<()> {
        self.check_event_writable()?;
        self.events
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::Missing(format!("event {}", id)))
    }

    fn list_events_in_range(
        &self,
        calendar_id: &str,
        from: DateKey,
        to: DateKey,
        role: i32,
    ) -> RepoResult<Vec<Event>> {
        Ok(Self::sorted(
            self.events
                .values()
                .filter(|e| e.calendar_id == calendar_id && e.visibility.visible_to(role))
                .filter(|e| e.start >= from && e.start <= to)
                .cloned()
                .collect(),
        ))
    }

    fn list_events_for_month(
        &self,
        calendar_id: &str,
        year: i64,
        month: u32,
        role: i32,
    ) -> RepoResult<Vec<Event>> {
        Ok(Self::sorted(
            self.events
                .values()
                .filter(|e| e.calendar_id == calendar_id && e.visibility.visible_to(role))
                .filter(|e| e.occurs_in_month(year, month))
                .cloned()
                .collect(),
        ))
    }
}
