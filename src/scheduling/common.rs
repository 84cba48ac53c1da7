use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::{mpsc, oneshot};

use crate::{
    error::ReminderError,
    reminder::{Reminder, ReminderTime},
    storage::StoreError,
};

/// A validated reminder waiting to be appended to the store.
#[derive(Debug)]
pub struct NewReminder {
    pub text: String,
    pub day: NaiveDate,
    pub time: ReminderTime,
}

/// The store's contents after a change. `version` grows by one with every
/// change the store task applies.
#[derive(Debug, Default, Clone)]
pub struct StoreState {
    pub version: u64,
    pub reminders: Vec<Reminder>,
}

/// Outcome of one check-and-fire pass.
#[derive(Debug, Default)]
pub struct FireReport {
    pub fired: Vec<Reminder>,
    pub remaining: StoreState,
}

pub type StoreReply<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum ReminderStoreMessage {
    Add {
        reminder: NewReminder,
        reply: StoreReply<(Reminder, StoreState)>,
    },
    CheckAndFire {
        now: NaiveDateTime,
        reply: StoreReply<FireReport>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<Reminder>>,
    },
}

/// Sending half of the store actor's mailbox. The `blocking_*` variants are
/// for callers outside the tokio runtime and panic inside an async context.
#[derive(Clone)]
pub struct ReminderStoreSender(mpsc::Sender<ReminderStoreMessage>);

impl ReminderStoreSender {
    pub fn new(inner: mpsc::Sender<ReminderStoreMessage>) -> Self {
        ReminderStoreSender(inner)
    }

    pub async fn add(&self, reminder: NewReminder) -> Result<(Reminder, StoreState), ReminderError> {
        let (reply, response) = oneshot::channel();
        self.send(ReminderStoreMessage::Add { reminder, reply }).await?;
        into_result(response.await)
    }

    pub async fn check_and_fire(&self, now: NaiveDateTime) -> Result<FireReport, ReminderError> {
        let (reply, response) = oneshot::channel();
        self.send(ReminderStoreMessage::CheckAndFire { now, reply })
            .await?;
        into_result(response.await)
    }

    pub fn blocking_check_and_fire(&self, now: NaiveDateTime) -> Result<FireReport, ReminderError> {
        let (reply, response) = oneshot::channel();
        self.0
            .blocking_send(ReminderStoreMessage::CheckAndFire { now, reply })
            .map_err(|_| ReminderError::StoreUnavailable)?;
        into_result(response.blocking_recv())
    }

    pub async fn snapshot(&self) -> Result<Vec<Reminder>, ReminderError> {
        let (reply, response) = oneshot::channel();
        self.send(ReminderStoreMessage::Snapshot { reply }).await?;
        response.await.map_err(|_| ReminderError::StoreUnavailable)
    }

    async fn send(&self, message: ReminderStoreMessage) -> Result<(), ReminderError> {
        self.0
            .send(message)
            .await
            .map_err(|_| ReminderError::StoreUnavailable)
    }
}

fn into_result<T>(
    response: Result<Result<T, StoreError>, oneshot::error::RecvError>,
) -> Result<T, ReminderError> {
    response
        .map_err(|_| ReminderError::StoreUnavailable)?
        .map_err(ReminderError::from)
}

/// The UI side of the store: told about every successful change.
pub trait StoreObserver: Send + Sync + 'static {
    fn on_store_changed(&self, reminders: &[Reminder]);
}

/// Observer for hosts without a view to refresh.
pub struct NoopObserver;

impl StoreObserver for NoopObserver {
    fn on_store_changed(&self, _reminders: &[Reminder]) {}
}

/// Hands store states to the observer in the order the store task produced
/// them. Replies reach their callers on different threads, so a state older
/// than the last one shown is dropped instead of overwriting it.
pub struct OrderedObserver {
    observer: Arc<dyn StoreObserver>,
    last_version: Mutex<u64>,
}

impl OrderedObserver {
    pub fn new(observer: Arc<dyn StoreObserver>) -> Self {
        Self {
            observer,
            last_version: Mutex::new(0),
        }
    }

    pub fn publish(&self, state: &StoreState) {
        let mut last_version = self
            .last_version
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if state.version <= *last_version {
            log::debug!(
                "Skipping stale store refresh. [version = {}, shown = {}]",
                state.version,
                *last_version
            );
            return;
        }

        *last_version = state.version;
        self.observer.on_store_changed(&state.reminders);
    }
}
