use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{DigestError, Result};

/// When a periodic job fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Every `every_days` days at a wall-clock time
    Daily { every_days: u32, at: NaiveTime },
    /// On the hour, every `every_hours` hours, aligned to midnight
    Hourly { every_hours: u32 },
}

impl Schedule {
    pub fn daily(every_days: u32, at: NaiveTime) -> Self {
        Self::Daily {
            every_days: every_days.max(1),
            at,
        }
    }

    pub fn hourly(every_hours: u32) -> Self {
        Self::Hourly {
            every_hours: every_hours.clamp(1, 24),
        }
    }

    /// First run strictly after `now`.
    pub fn first_run(&self, now: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Self::Daily { at, .. } => {
                let today = now.date().and_time(at);
                if today > now {
                    today
                } else {
                    today + Duration::days(1)
                }
            }
            Self::Hourly { every_hours } => {
                let mut next = now
                    .date()
                    .and_hms_opt(now.hour(), 0, 0)
                    .unwrap_or(now)
                    + Duration::hours(1);
                while next.hour() % every_hours != 0 {
                    next += Duration::hours(1);
                }
                next
            }
        }
    }

    /// Run after one that was due at `previous`.
    pub fn following(&self, previous: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Self::Daily { every_days, .. } => previous + Duration::days(i64::from(every_days)),
            Self::Hourly { .. } => self.first_run(previous),
        }
    }
}

/// Parse an `HH:MM` wall-clock time
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| DigestError::Config(format!("Invalid time '{}': {}", value, e)))
}
