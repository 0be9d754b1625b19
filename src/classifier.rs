use std::fmt;

use serde::{Deserialize, Serialize};

const SHORT_MAX_HOURS: u64 = 3;
const MEDIUM_MAX_HOURS: u64 = 6;

const SECONDS_PER_HOUR: u64 = 3600;

/// Band of remaining sleep, used to pick the alarm audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepCategory {
    Short,
    Medium,
    Long,
}

impl SleepCategory {
    pub fn from_remaining_seconds(seconds: u64) -> Self {
        classify(whole_hours(seconds))
    }
}

impl fmt::Display for SleepCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SleepCategory::Short => "short",
            SleepCategory::Medium => "medium",
            SleepCategory::Long => "long",
        };
        f.write_str(name)
    }
}

/// Bands are closed on their upper end: 3 hours is still short, 6 hours is still
/// medium.
pub fn classify(hours: u64) -> SleepCategory {
    match hours {
        h if h <= SHORT_MAX_HOURS => SleepCategory::Short,
        h if h <= MEDIUM_MAX_HOURS => SleepCategory::Medium,
        _ => SleepCategory::Long,
    }
}

pub fn whole_hours(seconds: u64) -> u64 {
    seconds / SECONDS_PER_HOUR
}
