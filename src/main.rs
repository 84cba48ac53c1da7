use std::{sync::Arc, time::Duration};

use reminder_app::{
    appsettings::AppSettings,
    console::{self, ConsoleView},
    delivery::{DesktopNotificationSink, LogNotificationSink, NotificationSink, ReminderNotifier},
    scheduling::{ReminderManager, ReminderScheduler, StoreObserver},
    storage::ReminderStore,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::new()?;
    log::info!("Starting reminder app. [settings = {:?}]", settings);

    let store = ReminderStore::load(&settings.storage.path, settings.storage.load_policy())?;

    let sink: Arc<dyn NotificationSink> = if settings.notification.desktop {
        Arc::new(DesktopNotificationSink::new(&settings.notification.app_name))
    } else {
        Arc::new(LogNotificationSink)
    };
    let notifier = ReminderNotifier::new(sink, &settings.notification);
    let view = Arc::new(ConsoleView);
    let manager = ReminderManager::create(store, notifier, view.clone());

    view.on_store_changed(&manager.snapshot().await?);

    ReminderScheduler::spawn_background(
        manager.clone(),
        settings.scheduler.background_interval(),
    )?;
    let foreground =
        ReminderScheduler::spawn_foreground(manager.clone(), settings.scheduler.foreground_interval());

    console::run(manager).await?;

    foreground.cancel(Duration::from_secs(5)).await;
    log::info!("Reminder app stopped.");

    Ok(())
}
