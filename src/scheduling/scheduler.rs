use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use super::alarm::{AlarmId, AlarmState, ArmPolicy, ArmedAlarm};
use crate::{
    classifier::SleepCategory,
    clock::Clock,
    error::AlarmError,
    notification::AlarmNotifier,
    time_of_day::{self, TimeOfDay},
};

pub const ALARM_TITLE: &str = "Alarm Alert";
pub const ALARM_MESSAGE: &str = "Time to wake up!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Upper bound on a single sleep of the background wait, and so on the firing
    /// delay against the clock.
    pub poll_interval: Duration,
    pub cancel_timeout: Duration,
    pub arm_policy: ArmPolicy,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            cancel_timeout: Duration::from_secs(5),
            arm_policy: ArmPolicy::Reject,
        }
    }
}

struct ScheduledWait {
    alarm: ArmedAlarm,
    task_handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl ScheduledWait {
    async fn cancel(self, timeout: Duration) {
        self.cancellation_token.cancel();
        let cancel_with_timeout = time::timeout(timeout, self.task_handle);
        if cancel_with_timeout.await.is_err() {
            log::warn!(
                "Wait task did not stop within {:?}. [alarm_id = {}]",
                timeout,
                self.alarm.id
            );
        }
    }
}

struct SchedulerState {
    state: AlarmState,
    scheduled: Option<ScheduledWait>,
    last_id: AlarmId,
}

struct Shared {
    state: Mutex<SchedulerState>,
    status: watch::Sender<AlarmState>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn AlarmNotifier>,
    settings: SchedulerSettings,
}

impl Shared {
    fn transition(&self, state: &mut SchedulerState, next: AlarmState) {
        log::debug!("Alarm state {:?} -> {:?}", state.state, next);
        state.state = next;
        self.status.send_replace(next);
    }
}

/// Owner of the single alarm of the process.
///
/// `Idle -> Armed -> Firing -> Idle`, or `Armed -> Cancelled -> Idle`. Every
/// transition happens under one lock, so two callers can never both observe
/// `Idle` and arm. Arming returns immediately; the wait for the target runs on a
/// spawned tokio task and has to be called from within a runtime.
pub struct AlarmScheduler {
    shared: Arc<Shared>,
}

impl AlarmScheduler {
    pub fn new(
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn AlarmNotifier>,
        settings: SchedulerSettings,
    ) -> Self {
        let (status, _) = watch::channel(AlarmState::Idle);
        let shared = Shared {
            state: Mutex::new(SchedulerState {
                state: AlarmState::Idle,
                scheduled: None,
                last_id: 0,
            }),
            status,
            clock,
            notifier,
            settings,
        };

        Self {
            shared: Arc::new(shared),
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.shared.settings
    }

    /// Arms `time` relative to the scheduler's own clock.
    pub async fn arm_now(&self, time: TimeOfDay) -> Result<ArmedAlarm, AlarmError> {
        self.arm(time, self.shared.clock.now()).await
    }

    /// Arms the alarm for the next occurrence of `time` after `now`. With
    /// [`ArmPolicy::Reject`] an armed alarm is left as is and `AlreadyArmed` is
    /// returned; with [`ArmPolicy::Replace`] its wait is torn down first. A firing
    /// alarm is never replaced.
    pub async fn arm(
        &self,
        time: TimeOfDay,
        now: time_of_day::Instant,
    ) -> Result<ArmedAlarm, AlarmError> {
        let mut state = self.shared.state.lock().await;

        match (state.state, self.shared.settings.arm_policy) {
            (AlarmState::Idle, _) => {}
            (AlarmState::Armed, ArmPolicy::Replace) => {
                if let Some(replaced) = self.cancel_locked(&mut state).await {
                    log::info!("Replacing armed alarm. [alarm_id = {}]", replaced.id);
                }
            }
            _ => {
                let target = state
                    .scheduled
                    .as_ref()
                    .map_or(now, |scheduled| scheduled.alarm.target);
                return Err(AlarmError::AlreadyArmed(target));
            }
        }

        let target = time_of_day::to_instant_after(time, now);
        let remaining = time_of_day::seconds_until(target, now);
        let category = SleepCategory::from_remaining_seconds(remaining);

        state.last_id += 1;
        let alarm = ArmedAlarm {
            id: state.last_id,
            time,
            target,
            armed_at: now,
            category,
        };

        let cancellation_token = CancellationToken::new();
        let task_handle = tokio::spawn(wait_and_fire(
            Arc::clone(&self.shared),
            alarm.clone(),
            cancellation_token.child_token(),
        ));

        state.scheduled = Some(ScheduledWait {
            alarm: alarm.clone(),
            task_handle,
            cancellation_token,
        });
        self.shared.transition(&mut state, AlarmState::Armed);

        log::info!(
            "[ARMED] Alarm set for {}, {} minutes remaining, category {}. [alarm_id = {}]",
            target.format("%Y-%m-%d %H:%M"),
            remaining / 60,
            category,
            alarm.id
        );

        Ok(alarm)
    }

    /// Cancels the armed alarm and waits for its background wait to stop. Returns
    /// `None` when nothing was armed; a firing alarm runs to completion.
    pub async fn cancel(&self) -> Option<ArmedAlarm> {
        let mut state = self.shared.state.lock().await;
        self.cancel_locked(&mut state).await
    }

    async fn cancel_locked(&self, state: &mut SchedulerState) -> Option<ArmedAlarm> {
        if state.state != AlarmState::Armed {
            return None;
        }
        let scheduled = state.scheduled.take()?;
        let alarm = scheduled.alarm.clone();

        self.shared.transition(state, AlarmState::Cancelled);
        scheduled.cancel(self.shared.settings.cancel_timeout).await;
        self.shared.transition(state, AlarmState::Idle);

        log::info!("[CANCELLED] Alarm cancelled. [alarm_id = {}]", alarm.id);
        Some(alarm)
    }

    pub async fn state(&self) -> AlarmState {
        self.shared.state.lock().await.state
    }

    pub async fn current(&self) -> Option<ArmedAlarm> {
        let state = self.shared.state.lock().await;
        state
            .scheduled
            .as_ref()
            .map(|scheduled| scheduled.alarm.clone())
    }

    /// Receives every state transition from now on.
    pub fn subscribe(&self) -> watch::Receiver<AlarmState> {
        self.shared.status.subscribe()
    }

    pub async fn shutdown(&self) {
        if let Some(alarm) = self.cancel().await {
            log::info!("Scheduler shutting down, cancelled alarm {}", alarm.id);
        }
    }
}

impl Drop for AlarmScheduler {
    fn drop(&mut self) {
        if let Ok(state) = self.shared.state.try_lock() {
            if let Some(scheduled) = &state.scheduled {
                scheduled.cancellation_token.cancel();
            }
        }
    }
}

/// Background half of the alarm: sleeps towards the target in steps of at most
/// the poll interval, re-reading the clock after each step, then fires once.
async fn wait_and_fire(
    shared: Arc<Shared>,
    alarm: ArmedAlarm,
    cancellation_token: CancellationToken,
) {
    loop {
        let now = shared.clock.now();
        if now >= alarm.target {
            break;
        }

        let remaining = (alarm.target - now).to_std().unwrap_or_default();
        let delay = remaining.min(shared.settings.poll_interval);

        tokio::select! {
            _ = cancellation_token.cancelled() => {
                log::info!("Wait for alarm was cancelled. [alarm_id = {}]", alarm.id);
                return;
            }
            _ = time::sleep(delay) => {}
        }
    }

    let mut state = tokio::select! {
        _ = cancellation_token.cancelled() => return,
        state = shared.state.lock() => state,
    };

    let is_current = state
        .scheduled
        .as_ref()
        .is_some_and(|scheduled| scheduled.alarm.id == alarm.id);
    if state.state != AlarmState::Armed || !is_current {
        log::warn!("Alarm is no longer armed, not firing. [alarm_id = {}]", alarm.id);
        return;
    }
    shared.transition(&mut state, AlarmState::Firing);
    drop(state);

    log::info!("[FIRING] Alarm! Time to wake up! [alarm_id = {}]", alarm.id);
    // Own task so a panicking notifier surfaces as a JoinError instead of
    // unwinding past the return to Idle.
    let notifier = Arc::clone(&shared.notifier);
    let delivery =
        tokio::spawn(async move { notifier.notify(ALARM_TITLE, ALARM_MESSAGE).await });
    match delivery.await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => log::error!(
            "Could not deliver alarm notification. [alarm_id = {}, error = {:#}]",
            alarm.id,
            error
        ),
        Err(error) => log::error!(
            "Alarm notifier crashed. [alarm_id = {}, error = {}]",
            alarm.id,
            error
        ),
    }

    let mut state = shared.state.lock().await;
    state.scheduled = None;
    shared.transition(&mut state, AlarmState::Idle);
}
