use thiserror::Error;

use crate::{registry::EntryId, time_of_day::Instant};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlarmError {
    #[error("Invalid format {input:?}, expected {expected}")]
    InvalidFormat {
        input: String,
        expected: &'static str,
    },

    #[error("Invalid cycle range, min_cycles = {min} is greater than max_cycles = {max}")]
    InvalidRange { min: u32, max: u32 },

    #[error("An alarm is already armed for {}", .0.format("%Y-%m-%d %H:%M"))]
    AlreadyArmed(Instant),

    #[error("Index {index} is out of range, there are {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No entry with id {0}")]
    UnknownEntry(EntryId),
}
