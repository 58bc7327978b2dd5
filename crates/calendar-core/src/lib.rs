//! # calendar-core
//!
//! Fantasy and real-world calendar engine for campaign worlds.
//!
//! Calendars here are not Gregorian: months have arbitrary lengths, leap years
//! follow a configurable period, weeks are any length, and any number of moons
//! cycle independently. This crate does the arithmetic over such calendars and
//! moves them in and out of the file formats used by other tabletop tools.
//!
//! ## Quick start
//!
//! ```rust
//! use calendar_core::{advance_date, Calendar, Month};
//!
//! let mut calendar = Calendar::new("cal-1", "campaign-1", "Two Moons");
//! calendar.months = vec![Month::new("Frost", 30), Month::new("Thaw", 30)];
//! calendar.current.month = 2;
//! calendar.current.day = 29;
//!
//! advance_date(&mut calendar, 2).unwrap();
//! assert_eq!((calendar.current.year, calendar.current.month, calendar.current.day), (2, 1, 1));
//! ```
//!
//! ## Modules
//!
//! - [`model`]: calendar types and pure arithmetic (leap years, weekdays, moon phases, seasons)
//! - [`advance`]: date and time rollover
//! - [`detect`]: import format fingerprinting
//! - [`import`]: adapters for Chronicle, Simple Calendar, Calendaria and Fantasy-Calendar.com
//! - [`export`]: canonical Chronicle export
//! - [`event`]: calendar events, visibility and recurrence
//! - [`repository`]: persistence contract and an in-memory implementation
//! - [`service`]: validated commands over a repository
//! - [`config`]: service limits
//! - [`error`]: error types

pub mod advance;
pub mod config;
pub mod detect;
pub mod error;
pub mod event;
pub mod export;
pub mod import;
pub mod model;
pub mod repository;
pub mod service;

pub use advance::{advance_date, advance_time};
pub use config::Limits;
pub use detect::{detect_format, ImportFormat};
pub use error::{CalendarError, ErrorKind};
pub use event::{DateKey, Event, EventInput, RecurrenceType, Visibility, ROLE_OWNER};
pub use export::{export_calendar, ChronicleDocument};
pub use import::{parse_import, ImportResult, ImportSettings};
pub use model::{
    Calendar, CalendarMode, CurrentDate, DateSnapshot, Era, Month, Moon, MoonPhaseName, Season,
    Weekday,
};
pub use repository::{CalendarRepository, InMemoryRepository, RepositoryError};
pub use service::{CalendarService, CalendarSettings, NewCalendar};
