use chrono::{Local, Utc};
use chrono_tz::Tz;

use crate::time_of_day::Instant;

/// Source of the current wall-clock instant.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Option<Tz>,
}

impl SystemClock {
    pub fn local() -> Self {
        Self { timezone: None }
    }

    pub fn in_timezone(timezone: Tz) -> Self {
        Self {
            timezone: Some(timezone),
        }
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}
