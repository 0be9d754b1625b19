mod alarm;
mod scheduler;

pub use alarm::{AlarmId, AlarmState, ArmPolicy, ArmedAlarm};
pub use scheduler::{ALARM_MESSAGE, ALARM_TITLE, AlarmScheduler, SchedulerSettings};
