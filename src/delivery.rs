use std::sync::Arc;

use async_trait::async_trait;

use crate::{appsettings::NotificationSettings, reminder::Reminder, time_parser};

/// Surfaces fired reminders to the user.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn notify(&self, title: &str, body: &str, timeout_seconds: u32) -> anyhow::Result<()>;
}

/// Posts desktop notifications through the platform notification service.
pub struct DesktopNotificationSink {
    app_name: String,
}

impl DesktopNotificationSink {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for DesktopNotificationSink {
    async fn notify(&self, title: &str, body: &str, timeout_seconds: u32) -> anyhow::Result<()> {
        let notification = notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(title)
            .body(body)
            .timeout(notify_rust::Timeout::Milliseconds(
                timeout_seconds.saturating_mul(1000),
            ))
            .finalize();

        tokio::task::spawn_blocking(move || notification.show().map(|_| ())).await??;

        Ok(())
    }
}

/// Writes notifications to the log, for machines without a notification service.
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, title: &str, body: &str, _timeout_seconds: u32) -> anyhow::Result<()> {
        log::info!("{}: {}", title, body.replace('\n', " | "));
        Ok(())
    }
}

/// Turns fired reminders into notifications for a [`NotificationSink`].
#[derive(Clone)]
pub struct ReminderNotifier {
    sink: Arc<dyn NotificationSink>,
    title: String,
    timeout_seconds: u32,
}

impl ReminderNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>, settings: &NotificationSettings) -> Self {
        Self {
            sink,
            title: settings.title.clone(),
            timeout_seconds: settings.timeout_secs,
        }
    }

    /// A failed notification is logged; the reminder counts as fired either way.
    pub async fn notify_fired(&self, reminder: &Reminder) {
        let body = get_message_text(reminder);
        if let Err(error) = self
            .sink
            .notify(&self.title, &body, self.timeout_seconds)
            .await
        {
            log::error!(
                "Could not show notification for reminder. [error = {:#}, text = {}, fire_at = {}]",
                error,
                reminder.text,
                reminder.fire_at()
            );
        }
    }
}

pub fn get_message_text(reminder: &Reminder) -> String {
    format!(
        "You have to do: {}\nAt {}",
        reminder.text,
        time_parser::format_time(&reminder.time)
    )
}
