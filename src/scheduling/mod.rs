mod common;
mod manager;
mod scheduler;

pub use common::{FireReport, NewReminder, NoopObserver, StoreObserver, StoreState};
pub use manager::ReminderManager;
pub use scheduler::{Cadence, ReminderScheduler, ScheduledTask};
