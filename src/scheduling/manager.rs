use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc;

use crate::{
    delivery::ReminderNotifier,
    error::ReminderError,
    reminder::Reminder,
    storage::{ReminderStore, StoreError},
    time_parser,
};

use super::common::{
    FireReport, NewReminder, OrderedObserver, ReminderStoreMessage, ReminderStoreSender,
    StoreObserver, StoreState,
};

const MAILBOX_SIZE: usize = 64;

/// Front door to the reminder store.
///
/// The store itself lives inside a single task that handles one message at a
/// time, so an add and any number of check-and-fire passes, from whichever
/// loop, are applied one after another. The observer is called only after the
/// task has replied, and never with a state older than one it already saw.
#[derive(Clone)]
pub struct ReminderManager {
    sender: ReminderStoreSender,
    observer: Arc<OrderedObserver>,
}

impl ReminderManager {
    /// Spawns the store task on the current tokio runtime.
    pub fn create(
        store: ReminderStore,
        notifier: ReminderNotifier,
        observer: Arc<dyn StoreObserver>,
    ) -> Self {
        let (channel_sender, receiver) = mpsc::channel(MAILBOX_SIZE);
        tokio::spawn(async move {
            Self::handle_messages(store, notifier, receiver).await;
        });

        Self {
            sender: ReminderStoreSender::new(channel_sender),
            observer: Arc::new(OrderedObserver::new(observer)),
        }
    }

    pub async fn add(
        &self,
        text: &str,
        day_text: &str,
        time_text: &str,
    ) -> Result<Reminder, ReminderError> {
        self.add_at(text, day_text, time_text, Local::now().naive_local())
            .await
    }

    /// Validates the input against `now` and appends the reminder. Rejected
    /// input never reaches the store.
    pub async fn add_at(
        &self,
        text: &str,
        day_text: &str,
        time_text: &str,
        now: NaiveDateTime,
    ) -> Result<Reminder, ReminderError> {
        let day = time_parser::parse_day(day_text)?;
        let time = time_parser::parse_time(time_text)?;
        let fire_at = day.and_time(*time.time());
        if fire_at <= now {
            return Err(ReminderError::PastDate { fire_at });
        }

        let reminder = NewReminder {
            text: text.to_owned(),
            day,
            time,
        };
        let (reminder, state) = self.sender.add(reminder).await?;
        self.observer.publish(&state);

        Ok(reminder)
    }

    pub async fn check_and_fire(&self) -> Result<Vec<Reminder>, ReminderError> {
        self.check_and_fire_at(Local::now().naive_local()).await
    }

    pub async fn check_and_fire_at(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, ReminderError> {
        let report = self.sender.check_and_fire(now).await?;
        Ok(self.publish(report))
    }

    /// Same as [`Self::check_and_fire`], for threads outside the runtime.
    pub fn blocking_check_and_fire(&self) -> Result<Vec<Reminder>, ReminderError> {
        self.blocking_check_and_fire_at(Local::now().naive_local())
    }

    pub fn blocking_check_and_fire_at(&self, now: NaiveDateTime) -> Result<Vec<Reminder>, ReminderError> {
        let report = self.sender.blocking_check_and_fire(now)?;
        Ok(self.publish(report))
    }

    pub async fn snapshot(&self) -> Result<Vec<Reminder>, ReminderError> {
        self.sender.snapshot().await
    }

    fn publish(&self, report: FireReport) -> Vec<Reminder> {
        if !report.fired.is_empty() {
            self.observer.publish(&report.remaining);
        }

        report.fired
    }

    async fn handle_messages(
        mut store: ReminderStore,
        notifier: ReminderNotifier,
        mut receiver: mpsc::Receiver<ReminderStoreMessage>,
    ) {
        let mut version = 0;

        while let Some(msg) = receiver.recv().await {
            match msg {
                ReminderStoreMessage::Add { reminder, reply } => {
                    let result = store
                        .add(reminder.text, reminder.day, reminder.time)
                        .map(|reminder| {
                            version += 1;
                            let state = StoreState {
                                version,
                                reminders: store.snapshot(),
                            };
                            (reminder, state)
                        });

                    match &result {
                        Ok((reminder, _)) => log::info!(
                            "Added reminder. [text = {}, fire_at = {}]",
                            reminder.text,
                            reminder.fire_at()
                        ),
                        Err(error) => log::error!("Could not add reminder. [error = {}]", error),
                    }

                    let _ = reply.send(result);
                }
                ReminderStoreMessage::CheckAndFire { now, reply } => {
                    let result = Self::fire_due(&mut store, &notifier, &mut version, now).await;
                    let _ = reply.send(result);
                }
                ReminderStoreMessage::Snapshot { reply } => {
                    let _ = reply.send(store.snapshot());
                }
            }
        }

        log::info!("Reminder store stopped. [path = {}]", store.path().display());
    }

    /// The critical section: select, remove, persist, then notify in selection
    /// order. Nothing is notified unless the removal was persisted.
    async fn fire_due(
        store: &mut ReminderStore,
        notifier: &ReminderNotifier,
        version: &mut u64,
        now: NaiveDateTime,
    ) -> Result<FireReport, StoreError> {
        let fired = store.remove_fired(now).inspect_err(|error| {
            log::error!(
                "Could not remove fired reminders, will retry on next check. [error = {}, now = {}]",
                error,
                now
            )
        })?;
        if !fired.is_empty() {
            *version += 1;
        }

        for reminder in &fired {
            log::info!(
                "Firing reminder. [text = {}, fire_at = {}]",
                reminder.text,
                reminder.fire_at()
            );
            notifier.notify_fired(reminder).await;
        }

        Ok(FireReport {
            fired,
            remaining: StoreState {
                version: *version,
                reminders: store.snapshot(),
            },
        })
    }
}
