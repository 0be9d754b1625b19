use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta};

use crate::{clock::Clock, notification::AlarmNotifier, time_of_day::Instant};

pub fn instant(date: (i32, u32, u32), hour: u32, minute: u32) -> Instant {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Wall clock driven by tokio's (possibly paused) time, starting at `origin`.
pub struct TokioClock {
    origin: Instant,
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        self.origin + TimeDelta::from_std(self.started.elapsed()).unwrap()
    }
}

pub type ReceivedNotifications = Arc<Mutex<Vec<(String, String)>>>;

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub received: ReceivedNotifications,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl AlarmNotifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str) -> anyhow::Result<()> {
        self.received
            .lock()
            .unwrap()
            .push((title.to_owned(), message.to_owned()));
        if self.fail {
            anyhow::bail!("Notification daemon is not running");
        }
        Ok(())
    }
}

pub struct PanickingNotifier;

#[async_trait]
impl AlarmNotifier for PanickingNotifier {
    async fn notify(&self, _title: &str, _message: &str) -> anyhow::Result<()> {
        panic!("notifier blew up");
    }
}

/// Records the notification, then holds the caller until `release` is notified.
#[derive(Clone, Default)]
pub struct GatedNotifier {
    pub inner: RecordingNotifier,
    pub release: Arc<tokio::sync::Notify>,
}

#[async_trait]
impl AlarmNotifier for GatedNotifier {
    async fn notify(&self, title: &str, message: &str) -> anyhow::Result<()> {
        self.inner.notify(title, message).await?;
        self.release.notified().await;
        Ok(())
    }
}
