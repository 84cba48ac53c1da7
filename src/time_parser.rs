use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::reminder::ReminderTime;

/// Accepted time-of-day formats, in priority order.
pub const TIME_FORMATS: [&str; 3] = ["%I:%M %p", "%H:%M:%S", "%H:%M"];

/// The only accepted format for user-supplied days.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Format used when writing a time back to the reminder file.
pub const STORED_TIME_FORMAT: &str = "%H:%M:%S";

const STORED_DAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Time format not recognized: {0}")]
    Time(String),

    #[error("Date format not recognized, expected YYYY-MM-DD: {0}")]
    Day(String),
}

impl FormatError {
    pub fn input(&self) -> &str {
        match self {
            FormatError::Time(input) | FormatError::Day(input) => input,
        }
    }
}

/// Parses a time-of-day, trying every entry of [`TIME_FORMATS`] in order.
pub fn parse_time(text: &str) -> Result<ReminderTime, FormatError> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .map(ReminderTime::new)
        .ok_or_else(|| FormatError::Time(text.to_owned()))
}

pub fn parse_day(text: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(text, DAY_FORMAT).map_err(|_| FormatError::Day(text.to_owned()))
}

/// Lenient day parsing for the reminder file: spreadsheet tools tend to turn a
/// date cell into a date-time, so the time part is accepted and dropped.
pub(crate) fn parse_stored_day(text: &str) -> Result<NaiveDate, FormatError> {
    parse_day(text).or_else(|err| {
        NaiveDateTime::parse_from_str(text, STORED_DAY_TIME_FORMAT)
            .map(|day_time| day_time.date())
            .map_err(|_| err)
    })
}

pub fn format_time(time: &ReminderTime) -> String {
    time.time().format(STORED_TIME_FORMAT).to_string()
}

pub fn format_day(day: &NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}
