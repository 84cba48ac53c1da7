use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Text used when the user leaves the reminder text empty.
pub const DEFAULT_REMINDER_TEXT: &str = "Reminder";

/// Time-of-day of a reminder, always with whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time = inner.with_nanosecond(0).unwrap_or(inner);
        Self(normalized_time)
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }

    pub fn into_time(self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for ReminderTime {
    fn from(value: NaiveTime) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub text: String,
    pub day: NaiveDate,
    pub time: ReminderTime,
}

impl Reminder {
    /// Builds a reminder, substituting [`DEFAULT_REMINDER_TEXT`] for empty text.
    pub fn new(text: impl Into<String>, day: NaiveDate, time: impl Into<ReminderTime>) -> Self {
        let text = text.into();
        let text = if text.is_empty() {
            DEFAULT_REMINDER_TEXT.to_owned()
        } else {
            text
        };

        Self {
            text,
            day,
            time: time.into(),
        }
    }

    /// The local wall-clock instant at which the reminder becomes due.
    pub fn fire_at(&self) -> NaiveDateTime {
        self.day.and_time(*self.time.time())
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.fire_at() <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn empty_text_is_replaced_with_placeholder() {
        let reminder = Reminder::new("", day(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        assert_eq!(reminder.text, DEFAULT_REMINDER_TEXT);
    }

    #[test]
    fn non_empty_text_is_kept() {
        let reminder = Reminder::new("Water plants", day(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        assert_eq!(reminder.text, "Water plants");
    }

    #[test]
    fn time_is_truncated_to_seconds() {
        let time = NaiveTime::from_hms_milli_opt(9, 15, 30, 750).unwrap();

        let reminder_time = ReminderTime::new(time);

        assert_eq!(*reminder_time.time(), NaiveTime::from_hms_opt(9, 15, 30).unwrap());
    }

    #[test]
    fn reminder_is_due_at_exact_fire_time() {
        let reminder = Reminder::new("Call", day(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let fire_at = reminder.fire_at();

        assert!(reminder.is_due(fire_at));
        assert!(!reminder.is_due(fire_at - chrono::TimeDelta::seconds(1)));
    }
}
