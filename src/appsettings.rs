use std::{num::NonZeroU32, time::Duration};

use anyhow::{Context, ensure};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    audio::AudioCatalog,
    clock::SystemClock,
    cycle::SleepCycle,
    scheduling::{ArmPolicy, SchedulerSettings},
};

pub const DEFAULT_SETTINGS_FILE: &str = "appsettings";
const ENV_PREFIX: &str = "CYCLEWAKE";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SleepSettings {
    pub cycle_minutes: NonZeroU32,
    pub min_cycles: u32,
    pub max_cycles: u32,
}

impl Default for SleepSettings {
    fn default() -> Self {
        let cycle = SleepCycle::DEFAULT;
        Self {
            cycle_minutes: cycle.cycle_minutes(),
            min_cycles: cycle.min_cycles(),
            max_cycles: cycle.max_cycles(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerSection {
    pub poll_interval_secs: u64,
    pub cancel_timeout_secs: u64,
    pub arm_policy: ArmPolicy,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        let defaults = SchedulerSettings::default();
        Self {
            poll_interval_secs: defaults.poll_interval.as_secs(),
            cancel_timeout_secs: defaults.cancel_timeout.as_secs(),
            arm_policy: defaults.arm_policy,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    pub sleep: SleepSettings,
    pub scheduler: SchedulerSection,
    pub audio: AudioCatalog,
    /// IANA name; the system local zone when unset.
    pub timezone: Option<String>,
}

impl AppSettings {
    /// Layers `<name>.*`, `<name>.local.*` and `CYCLEWAKE_*` variables (sections
    /// separated by `__`) over the built-in defaults. Both files are optional.
    pub fn load(name: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(File::with_name(&format!("{name}.local")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn sleep_cycle(&self) -> anyhow::Result<SleepCycle> {
        let cycle = SleepCycle::new(
            self.sleep.cycle_minutes,
            self.sleep.min_cycles,
            self.sleep.max_cycles,
        )
        .context("Invalid [sleep] settings")?;
        Ok(cycle)
    }

    pub fn scheduler_settings(&self) -> anyhow::Result<SchedulerSettings> {
        ensure!(
            self.scheduler.poll_interval_secs > 0,
            "scheduler.poll_interval_secs must be greater than zero"
        );

        Ok(SchedulerSettings {
            poll_interval: Duration::from_secs(self.scheduler.poll_interval_secs),
            cancel_timeout: Duration::from_secs(self.scheduler.cancel_timeout_secs),
            arm_policy: self.scheduler.arm_policy,
        })
    }

    pub fn clock(&self) -> anyhow::Result<SystemClock> {
        match &self.timezone {
            Some(name) => {
                let tz = name
                    .parse::<Tz>()
                    .map_err(|err| anyhow::anyhow!("Invalid timezone {name:?}: {err}"))?;
                Ok(SystemClock::in_timezone(tz))
            }
            None => Ok(SystemClock::local()),
        }
    }
}
