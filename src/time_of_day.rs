use std::{fmt, str::FromStr};

use chrono::{Days, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::error::AlarmError;

/// Absolute local wall-clock point in time.
pub type Instant = NaiveDateTime;

const TIME_FORMAT: &str = "HH:MM";

/// Time of day with minute precision. Only obtainable through validated parsing
/// or from an already valid `NaiveTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Parses exactly `HH:MM`: two digits, a colon, two digits, hour below 24 and
    /// minute below 60.
    pub fn parse(input: &str) -> Result<Self, AlarmError> {
        let invalid = || AlarmError::InvalidFormat {
            input: input.to_owned(),
            expected: TIME_FORMAT,
        };

        let bytes = input.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }

        let hour = two_digits(&bytes[0..2]).ok_or_else(invalid)?;
        let minute = two_digits(&bytes[3..5]).ok_or_else(invalid)?;

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(invalid)
    }

    pub fn from_time(time: NaiveTime) -> Self {
        let normalized = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        Self(normalized)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Adds `delta` on the 24 hour clock, wrapping past midnight.
    pub fn wrapping_add(&self, delta: TimeDelta) -> Self {
        Self::from_time(self.0 + delta)
    }
}

impl FromStr for TimeOfDay {
    type Err = AlarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

fn two_digits(pair: &[u8]) -> Option<u32> {
    match pair {
        [tens, ones] if tens.is_ascii_digit() && ones.is_ascii_digit() => {
            Some(u32::from(tens - b'0') * 10 + u32::from(ones - b'0'))
        }
        _ => None,
    }
}

/// Places `time` on the reference date. A result at or before `reference` has
/// already passed and moves to the next calendar day.
pub fn to_instant_after(time: TimeOfDay, reference: Instant) -> Instant {
    let same_day = reference.date().and_time(time.time());
    if same_day > reference {
        return same_day;
    }

    same_day
        .checked_add_days(Days::new(1))
        .expect("Not realistic to overflow")
}

/// Whole seconds from `reference` to `target`. Callers roll over with
/// [`to_instant_after`] first, so `target` is never behind `reference`.
pub fn seconds_until(target: Instant, reference: Instant) -> u64 {
    debug_assert!(
        target >= reference,
        "target {target} is before reference {reference}"
    );
    u64::try_from((target - reference).num_seconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};
    use proptest::prelude::*;
    use proptest_arbitrary_interop::arb;

    use super::*;

    fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> Instant {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn parses_valid_times() {
        let time = TimeOfDay::parse("07:30").unwrap();

        assert_eq!(time.hour(), 7);
        assert_eq!(time.minute(), 30);
        assert_eq!(TimeOfDay::parse("00:00").unwrap().to_string(), "00:00");
        assert_eq!(TimeOfDay::parse("23:59").unwrap().to_string(), "23:59");
    }

    #[test]
    fn rejects_malformed_times() {
        for input in [
            "", "7:30", "07:3", "0730", "07-30", "24:00", "23:60", "99:99", "ab:cd", " 7:30",
            "07:30 ", "07:30:00", "+1:30", "1:030", "٠٧:٣٠",
        ] {
            let result = TimeOfDay::parse(input);
            assert!(
                matches!(result, Err(AlarmError::InvalidFormat { .. })),
                "input = {input:?}, result = {result:?}"
            );
        }
    }

    #[test]
    fn wrapping_add_crosses_midnight() {
        let bedtime = TimeOfDay::parse("23:00").unwrap();

        assert_eq!(bedtime.wrapping_add(TimeDelta::minutes(360)).to_string(), "05:00");
    }

    #[test]
    fn later_time_stays_on_reference_day() {
        let reference = at((2025, 5, 31), 22, 0);
        let time = TimeOfDay::parse("23:15").unwrap();

        assert_eq!(to_instant_after(time, reference), at((2025, 5, 31), 23, 15));
    }

    #[test]
    fn passed_time_rolls_to_next_day() {
        let reference = at((2025, 12, 31), 23, 0);
        let time = TimeOfDay::parse("05:30").unwrap();

        assert_eq!(to_instant_after(time, reference), at((2026, 1, 1), 5, 30));
    }

    #[test]
    fn time_equal_to_reference_rolls_exactly_one_day() {
        let reference = at((2025, 5, 31), 12, 0);
        let time = TimeOfDay::parse("12:00").unwrap();

        let instant = to_instant_after(time, reference);

        assert_eq!(instant, at((2025, 6, 1), 12, 0));
        assert_eq!(seconds_until(instant, reference), 24 * 3600);
    }

    #[test]
    fn seconds_until_counts_whole_seconds() {
        let reference = at((2025, 5, 31), 23, 0);
        let target = at((2025, 6, 1), 5, 30);

        assert_eq!(seconds_until(target, reference), 6 * 3600 + 30 * 60);
    }

    fn reference_strategy() -> impl Strategy<Value = Instant> {
        (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
            |(year, month, day, hour, minute, second)| {
                NaiveDate::from_ymd_opt(year, month, day)
                    .unwrap()
                    .and_hms_opt(hour, minute, second)
                    .unwrap()
            },
        )
    }

    proptest! {
        #[test]
        fn valid_times_round_trip(hour in 0u32..24, minute in 0u32..60) {
            let canonical = format!("{hour:02}:{minute:02}");
            let parsed = TimeOfDay::parse(&canonical).unwrap();

            prop_assert_eq!(parsed.to_string(), canonical);
        }

        #[test]
        fn from_time_keeps_hour_and_minute_only(time in arb::<NaiveTime>()) {
            let normalized = TimeOfDay::from_time(time);

            prop_assert_eq!((normalized.hour(), normalized.minute()), (time.hour(), time.minute()));
            prop_assert_eq!(normalized.time().second(), 0);
            prop_assert_eq!(normalized.time().nanosecond(), 0);
            prop_assert_eq!(TimeOfDay::parse(&normalized.to_string()).unwrap(), normalized);
        }

        #[test]
        fn out_of_range_times_are_rejected(hour in 0u32..100, minute in 0u32..100) {
            prop_assume!(hour >= 24 || minute >= 60);
            let input = format!("{hour:02}:{minute:02}");

            let is_invalid_format = matches!(
                TimeOfDay::parse(&input),
                Err(AlarmError::InvalidFormat { .. })
            );
            prop_assert!(is_invalid_format);
        }

        #[test]
        fn instant_after_is_within_next_day(
            reference in reference_strategy(),
            hour in 0u32..24,
            minute in 0u32..60,
        ) {
            let time = TimeOfDay::parse(&format!("{hour:02}:{minute:02}")).unwrap();
            let instant = to_instant_after(time, reference);

            prop_assert!(instant > reference, "Target time should always be in the future");
            prop_assert_eq!(instant.time(), time.time());
            prop_assert!(instant - reference <= TimeDelta::days(1));
            prop_assert_eq!(instant.second(), 0);
        }
    }
}
