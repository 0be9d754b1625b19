use std::num::NonZeroU32;

use chrono::TimeDelta;

use crate::{error::AlarmError, time_of_day::TimeOfDay};

const DEFAULT_CYCLE_MINUTES: NonZeroU32 = match NonZeroU32::new(90) {
    Some(minutes) => minutes,
    None => unreachable!(),
};
const DEFAULT_MIN_CYCLES: u32 = 4;
const DEFAULT_MAX_CYCLES: u32 = 6;
const MINUTES_PER_DAY: u64 = 24 * 60;

/// Wake-up proposal: the time reached after `cycles` full sleep cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeCandidate {
    pub cycles: u32,
    pub time: TimeOfDay,
}

/// Cycle duration and the inclusive range of cycle counts to propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepCycle {
    cycle_minutes: NonZeroU32,
    min_cycles: u32,
    max_cycles: u32,
}

impl SleepCycle {
    pub const DEFAULT: SleepCycle = SleepCycle {
        cycle_minutes: DEFAULT_CYCLE_MINUTES,
        min_cycles: DEFAULT_MIN_CYCLES,
        max_cycles: DEFAULT_MAX_CYCLES,
    };

    pub fn new(
        cycle_minutes: NonZeroU32,
        min_cycles: u32,
        max_cycles: u32,
    ) -> Result<Self, AlarmError> {
        if min_cycles > max_cycles {
            return Err(AlarmError::InvalidRange {
                min: min_cycles,
                max: max_cycles,
            });
        }

        Ok(Self {
            cycle_minutes,
            min_cycles,
            max_cycles,
        })
    }

    pub fn cycle_minutes(&self) -> NonZeroU32 {
        self.cycle_minutes
    }

    pub fn cycle_duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.cycle_minutes.get()))
    }

    pub fn min_cycles(&self) -> u32 {
        self.min_cycles
    }

    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }

    /// One candidate per cycle count, ascending. Relative to `bedtime` only, so the
    /// current time plays no part.
    pub fn candidates(&self, bedtime: TimeOfDay) -> Vec<WakeCandidate> {
        let cycle_minutes = u64::from(self.cycle_minutes.get());
        (self.min_cycles..=self.max_cycles)
            .map(|cycles| {
                // u32 * u32 always fits in u64; only the offset within a day matters.
                let offset = cycle_minutes * u64::from(cycles) % MINUTES_PER_DAY;
                WakeCandidate {
                    cycles,
                    time: bedtime.wrapping_add(TimeDelta::minutes(offset as i64)),
                }
            })
            .collect()
    }
}

impl Default for SleepCycle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Candidates for the standard 90 minute cycle between `min_cycles` and
/// `max_cycles` inclusive.
pub fn wake_candidates(
    bedtime: TimeOfDay,
    min_cycles: u32,
    max_cycles: u32,
) -> Result<Vec<WakeCandidate>, AlarmError> {
    let cycle = SleepCycle::new(DEFAULT_CYCLE_MINUTES, min_cycles, max_cycles)?;
    Ok(cycle.candidates(bedtime))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn times(candidates: &[WakeCandidate]) -> Vec<String> {
        candidates.iter().map(|c| c.time.to_string()).collect()
    }

    #[test]
    fn candidates_from_late_bedtime_cross_midnight() {
        let bedtime = TimeOfDay::parse("23:00").unwrap();

        let candidates = wake_candidates(bedtime, 4, 6).unwrap();

        assert_eq!(times(&candidates), ["05:00", "06:30", "08:00"]);
        assert_eq!(
            candidates.iter().map(|c| c.cycles).collect::<Vec<_>>(),
            [4, 5, 6]
        );
    }

    #[test]
    fn default_cycle_matches_standard_range() {
        let bedtime = TimeOfDay::parse("22:30").unwrap();

        let candidates = SleepCycle::default().candidates(bedtime);

        assert_eq!(times(&candidates), ["04:30", "06:00", "07:30"]);
    }

    #[test]
    fn huge_cycle_configuration_does_not_overflow() {
        let cycle = SleepCycle::new(NonZeroU32::MAX, u32::MAX, u32::MAX).unwrap();
        let bedtime = TimeOfDay::parse("00:00").unwrap();

        let candidates = cycle.candidates(bedtime);

        // (2^32 - 1)^2 minutes is 225 minutes past a whole number of days.
        assert_eq!(times(&candidates), ["03:45"]);
        assert_eq!(candidates[0].cycles, u32::MAX);
    }

    #[test]
    fn single_cycle_count_yields_one_candidate() {
        let bedtime = TimeOfDay::parse("00:00").unwrap();

        let candidates = wake_candidates(bedtime, 5, 5).unwrap();

        assert_eq!(times(&candidates), ["07:30"]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let bedtime = TimeOfDay::parse("23:00").unwrap();

        assert_eq!(
            wake_candidates(bedtime, 6, 4),
            Err(AlarmError::InvalidRange { min: 6, max: 4 })
        );
    }

    #[test]
    fn custom_cycle_duration_is_used() {
        let cycle = SleepCycle::new(NonZeroU32::new(100).unwrap(), 1, 2).unwrap();
        let bedtime = TimeOfDay::parse("22:00").unwrap();

        assert_eq!(times(&cycle.candidates(bedtime)), ["23:40", "01:20"]);
    }

    proptest! {
        #[test]
        fn candidates_are_spaced_by_whole_cycles(
            hour in 0u32..24,
            minute in 0u32..60,
            min_cycles in 0u32..10,
            extra in 0u32..10,
        ) {
            let bedtime = TimeOfDay::parse(&format!("{hour:02}:{minute:02}")).unwrap();
            let max_cycles = min_cycles + extra;

            let candidates = wake_candidates(bedtime, min_cycles, max_cycles).unwrap();

            prop_assert_eq!(candidates.len() as u32, max_cycles - min_cycles + 1);
            for (offset, candidate) in candidates.iter().enumerate() {
                let cycles = min_cycles + offset as u32;
                prop_assert_eq!(candidate.cycles, cycles);

                let bed_minutes = hour * 60 + minute;
                let wake_minutes = (bed_minutes + cycles * 90) % (24 * 60);
                prop_assert_eq!(candidate.time.hour() * 60 + candidate.time.minute(), wake_minutes);
            }
        }
    }
}
