use chrono::NaiveDateTime;
use thiserror::Error;

use crate::{storage::StoreError, time_parser::FormatError};

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("The date and time must be in the future. [fire_at = {fire_at}]")]
    PastDate { fire_at: NaiveDateTime },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Reminder store is not running")]
    StoreUnavailable,
}

impl ReminderError {
    /// Errors the user can fix by entering different input.
    pub fn is_validation(&self) -> bool {
        matches!(self, ReminderError::Format(_) | ReminderError::PastDate { .. })
    }
}
