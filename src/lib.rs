pub mod appsettings;
pub mod audio;
pub mod classifier;
pub mod clock;
pub mod cycle;
pub mod error;
pub mod notification;
pub mod registry;
pub mod scheduling;
pub mod shell;
pub mod time_of_day;

#[cfg(test)]
mod test_utils;

pub use error::AlarmError;
pub use time_of_day::{Instant, TimeOfDay};
