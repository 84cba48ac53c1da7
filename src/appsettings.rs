use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

use crate::storage::LoadPolicy;

#[derive(Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub path: PathBuf,
    pub skip_invalid_rows: bool,
}

impl StorageSettings {
    pub fn load_policy(&self) -> LoadPolicy {
        if self.skip_invalid_rows {
            LoadPolicy::SkipInvalidRows
        } else {
            LoadPolicy::Strict
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SchedulerSettings {
    pub foreground_interval_secs: u64,
    pub background_interval_secs: u64,
}

impl SchedulerSettings {
    pub fn foreground_interval(&self) -> Duration {
        Duration::from_secs(self.foreground_interval_secs)
    }

    pub fn background_interval(&self) -> Duration {
        Duration::from_secs(self.background_interval_secs)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct NotificationSettings {
    pub title: String,
    pub app_name: String,
    pub timeout_secs: u32,
    /// Post desktop notifications; when false they only go to the log.
    pub desktop: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            title: "Reminder".to_owned(),
            app_name: "Reminder Software".to_owned(),
            timeout_secs: 20,
            desktop: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub scheduler: SchedulerSettings,
    pub notification: NotificationSettings,
}

impl AppSettings {
    /// Reads `appsettings.*`, `appsettings.local.*` and `APP_*` variables, in
    /// increasing priority, over the built-in defaults.
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let notification = NotificationSettings::default();

        Config::builder()
            .set_default("storage.path", "reminder.csv")?
            .set_default("storage.skip_invalid_rows", false)?
            .set_default("scheduler.foreground_interval_secs", 10)?
            .set_default("scheduler.background_interval_secs", 60)?
            .set_default("notification.title", notification.title)?
            .set_default("notification.app_name", notification.app_name)?
            .set_default("notification.timeout_secs", notification.timeout_secs)?
            .set_default("notification.desktop", notification.desktop)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    #[test]
    fn defaults_match_original_cadences() {
        let settings: AppSettings = AppSettings::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.storage.path, PathBuf::from("reminder.csv"));
        assert_eq!(settings.storage.load_policy(), LoadPolicy::Strict);
        assert_eq!(settings.scheduler.foreground_interval(), Duration::from_secs(10));
        assert_eq!(settings.scheduler.background_interval(), Duration::from_secs(60));
        assert_eq!(settings.notification.title, "Reminder");
        assert_eq!(settings.notification.app_name, "Reminder Software");
        assert_eq!(settings.notification.timeout_secs, 20);
        assert!(settings.notification.desktop);
    }

    #[test]
    fn file_overrides_defaults() {
        let overrides = r#"
            [storage]
            path = "/tmp/reminders.csv"
            skip_invalid_rows = true

            [scheduler]
            background_interval_secs = 120

            [notification]
            desktop = false
        "#;

        let settings: AppSettings = AppSettings::defaults()
            .unwrap()
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.storage.path, PathBuf::from("/tmp/reminders.csv"));
        assert_eq!(settings.storage.load_policy(), LoadPolicy::SkipInvalidRows);
        assert_eq!(settings.scheduler.background_interval_secs, 120);
        assert_eq!(settings.scheduler.foreground_interval_secs, 10);
        assert!(!settings.notification.desktop);
        assert_eq!(settings.notification.title, "Reminder");
    }
}
