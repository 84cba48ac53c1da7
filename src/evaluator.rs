use chrono::NaiveDateTime;

use crate::reminder::Reminder;

/// Selects every reminder whose fire time is at or before `now`, keeping the
/// input order.
pub fn due(reminders: &[Reminder], now: NaiveDateTime) -> Vec<Reminder> {
    reminders
        .iter()
        .filter(|reminder| reminder.is_due(now))
        .cloned()
        .collect()
}
