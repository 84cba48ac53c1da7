mod model;
mod reminder_storage;

pub use model::{COLUMNS, ReminderRow};
pub use reminder_storage::{LoadPolicy, ReminderStore, StoreError};
