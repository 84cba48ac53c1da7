pub mod appsettings;
pub mod console;
pub mod delivery;
pub mod error;
pub mod evaluator;
pub mod reminder;
pub mod scheduling;
pub mod storage;
pub mod time_parser;

pub use error::ReminderError;
pub use reminder::{Reminder, ReminderTime};
