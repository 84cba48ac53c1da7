use serde::{Deserialize, Serialize};

use crate::{
    reminder::Reminder,
    time_parser::{self, FormatError},
};

/// Column headers of the reminder file, in order.
pub const COLUMNS: [&str; 3] = ["Text", "Day", "Time"];

#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderRow {
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Time")]
    pub time: String,
}

impl From<&Reminder> for ReminderRow {
    fn from(value: &Reminder) -> Self {
        Self {
            text: value.text.clone(),
            day: time_parser::format_day(&value.day),
            time: time_parser::format_time(&value.time),
        }
    }
}

impl TryFrom<ReminderRow> for Reminder {
    type Error = FormatError;

    fn try_from(value: ReminderRow) -> Result<Self, Self::Error> {
        let day = time_parser::parse_stored_day(&value.day)?;
        let time = time_parser::parse_time(&value.time)?;

        Ok(Reminder::new(value.text, day, time))
    }
}
