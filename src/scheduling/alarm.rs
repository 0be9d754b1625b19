use chrono::TimeDelta;
use serde::Deserialize;

use crate::{
    classifier::SleepCategory,
    time_of_day::{Instant, TimeOfDay},
};

pub type AlarmId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    Armed,
    Firing,
    Cancelled,
}

/// What `arm` does when an alarm is already armed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmPolicy {
    #[default]
    Reject,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedAlarm {
    pub id: AlarmId,
    pub time: TimeOfDay,
    pub target: Instant,
    pub armed_at: Instant,
    pub category: SleepCategory,
}

impl ArmedAlarm {
    pub fn remaining(&self) -> TimeDelta {
        self.target - self.armed_at
    }
}
