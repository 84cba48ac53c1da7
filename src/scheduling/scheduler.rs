use std::{fmt, io, ops::ControlFlow, thread, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{error::ReminderError, reminder::Reminder};

use super::manager::ReminderManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Foreground,
    Background,
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Foreground => write!(f, "foreground"),
            Cadence::Background => write!(f, "background"),
        }
    }
}

pub struct ScheduledTask {
    task_handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl ScheduledTask {
    pub fn new(task_handle: JoinHandle<()>, cancellation_token: CancellationToken) -> Self {
        Self {
            task_handle,
            cancellation_token,
        }
    }

    pub async fn cancel(self, timeout: Duration) {
        self.cancellation_token.cancel();
        let cancel_with_timeout = time::timeout(timeout, self.task_handle);
        let _ = cancel_with_timeout.await;
    }
}

pub struct ReminderScheduler;

impl ReminderScheduler {
    /// Checks every `period` on the current runtime, first one period after
    /// start. Never blocks the runtime thread.
    pub fn spawn_foreground(manager: ReminderManager, period: Duration) -> ScheduledTask {
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();

        let task_handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_cancellation_token.cancelled() => {
                        log::info!("Foreground reminder check was cancelled.");
                        break;
                    },
                    _ = interval.tick() => {
                        let result = manager.check_and_fire().await;
                        if handle_check_result(Cadence::Foreground, result).is_break() {
                            break;
                        }
                    }
                }
            }
        });

        ScheduledTask::new(task_handle, cancellation_token)
    }

    /// Checks immediately and then every `period` on a dedicated OS thread that
    /// sleeps in between. The thread is detached and lives until the process
    /// exits or the store goes away.
    pub fn spawn_background(
        manager: ReminderManager,
        period: Duration,
    ) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("reminder-background-check".to_owned())
            .spawn(move || {
                loop {
                    let result = manager.blocking_check_and_fire();
                    if handle_check_result(Cadence::Background, result).is_break() {
                        break;
                    }
                    thread::sleep(period);
                }
            })
    }
}

fn handle_check_result(
    cadence: Cadence,
    result: Result<Vec<Reminder>, ReminderError>,
) -> ControlFlow<()> {
    match result {
        Ok(fired) => {
            if !fired.is_empty() {
                log::info!(
                    "Fired {} reminders. [cadence = {}]",
                    fired.len(),
                    cadence
                );
            }
            ControlFlow::Continue(())
        }
        Err(ReminderError::StoreUnavailable) => {
            log::warn!("Reminder store is gone, stopping checks. [cadence = {}]", cadence);
            ControlFlow::Break(())
        }
        Err(error) => {
            log::error!(
                "Reminder check failed. [cadence = {}, error = {}]",
                cadence,
                error
            );
            ControlFlow::Continue(())
        }
    }
}
