//! Operational limits for the calendar service.
//!
//! Defaults mirror the bounds enforced by the request layer. They can be
//! tightened per deployment, either with the builder methods or from TOML:
//!
//! ```toml
//! max_advance_days = 365
//! max_advance_hours = 8760
//! max_import_bytes = 1048576
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

pub const DEFAULT_MAX_ADVANCE_DAYS: u64 = 3650;
pub const DEFAULT_MAX_ADVANCE_HOURS: u64 = 87_600;
pub const DEFAULT_MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Bounds applied by [`crate::service::CalendarService`].
///
/// # Example
///
/// ```
/// use calendar_core::Limits;
///
/// let limits = Limits::default().with_max_advance_days(365);
/// assert!(limits.validate().is_ok());
/// assert_eq!(limits.max_advance_days(), 365);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    max_advance_days: u64,
    max_advance_hours: u64,
    max_import_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_advance_days: DEFAULT_MAX_ADVANCE_DAYS,
            max_advance_hours: DEFAULT_MAX_ADVANCE_HOURS,
            max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
        }
    }
}

impl Limits {
    pub fn with_max_advance_days(mut self, days: u64) -> Self {
        self.max_advance_days = days;
        self
    }

    pub fn with_max_advance_hours(mut self, hours: u64) -> Self {
        self.max_advance_hours = hours;
        self
    }

    pub fn with_max_import_bytes(mut self, bytes: usize) -> Self {
        self.max_import_bytes = bytes;
        self
    }

    pub fn max_advance_days(&self) -> u64 {
        self.max_advance_days
    }

    pub fn max_advance_hours(&self) -> u64 {
        self.max_advance_hours
    }

    pub fn max_import_bytes(&self) -> usize {
        self.max_import_bytes
    }

    /// Every limit must be at least one.
    pub fn validate(&self) -> Result<()> {
        if self.max_advance_days == 0 {
            return Err(CalendarError::validation("max_advance_days must be >= 1"));
        }
        if self.max_advance_hours == 0 {
            return Err(CalendarError::validation("max_advance_hours must be >= 1"));
        }
        if self.max_import_bytes == 0 {
            return Err(CalendarError::validation("max_import_bytes must be >= 1"));
        }
        Ok(())
    }

    /// Parse and validate limits from TOML; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let limits: Limits = toml::from_str(content)
            .map_err(|e| CalendarError::validation(format!("invalid limits config: {}", e)))?;
        limits.validate()?;
        Ok(limits)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CalendarError::validation(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}
