use anyhow::Result;
use chrono::Local;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast;

use tadhkir::core::Config;
use tadhkir::features::corpus::Corpus;
use tadhkir::features::display::{DisplaySurface, FanoutDisplay, IpcDisplay, LogDisplay};
use tadhkir::features::reminders::ReminderScheduler;
use tadhkir::ipc::{ClientCommand, DaemonEvent, IpcServer};
use tadhkir::platform::{AlarmScheduler, TokioAlarms};
use tadhkir::store::SettingsStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    info!("Starting tadhkir reminder daemon...");

    let corpus = Arc::new(Corpus::load_embedded()?);
    if corpus.is_empty() {
        warn!("Reminder corpus is empty, scheduled fires will be skipped");
    }

    let store = Arc::new(SettingsStore::open(&config.settings_path)?);

    // Start IPC server for front-end communication
    let ipc_server = Arc::new(IpcServer::new());
    if let Err(e) = ipc_server.clone().start(&config.socket_path).await {
        error!("Failed to start IPC server: {e}. Front-end control will be unavailable.");
    }

    // Heartbeat keeps idle front-end connections warm
    let heartbeat_ipc = ipc_server.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            heartbeat_ipc.broadcast_event(DaemonEvent::Heartbeat {
                timestamp: Local::now().timestamp(),
            });
        }
    });

    let mut surfaces: Vec<Arc<dyn DisplaySurface>> = Vec::new();
    if config.log_display {
        surfaces.push(Arc::new(LogDisplay));
    }
    surfaces.push(Arc::new(IpcDisplay::new(ipc_server.clone())));
    let display = Arc::new(FanoutDisplay::new(surfaces));

    let (alarms, mut alarm_rx) = TokioAlarms::new();
    let scheduler = Arc::new(ReminderScheduler::new(
        alarms.clone(),
        store.clone(),
        corpus,
        display,
    ));

    let settings = store.settings().await;
    scheduler.rebuild_schedule(&settings).await;

    let mut changes = store.subscribe();

    info!("Reminder daemon ready");

    loop {
        tokio::select! {
            Some(fired) = alarm_rx.recv() => {
                scheduler.on_alarm_fired(&fired.name, fired.at).await;
            }
            change = changes.recv() => match change {
                Ok(change) => {
                    scheduler.on_settings_changed(&change).await;
                    ipc_server.broadcast_event(DaemonEvent::SettingsUpdated {
                        settings: change.new,
                    });
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Missed {skipped} settings changes, rebuilding from current state");
                    let settings = store.settings().await;
                    scheduler.rebuild_schedule(&settings).await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    warn!("Settings change stream closed");
                    break;
                }
            },
            Some(command) = ipc_server.next_command() => {
                handle_command(command, &store, &scheduler, &ipc_server).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    if let Err(e) = alarms.clear_all().await {
        warn!("Failed to clear alarms during shutdown: {e:#}");
    }
    let _ = std::fs::remove_file(&config.socket_path);
    info!("Reminder daemon stopped");

    Ok(())
}

/// Answer one front-end command with a CommandResponse event
async fn handle_command(
    command: ClientCommand,
    store: &Arc<SettingsStore>,
    scheduler: &Arc<ReminderScheduler>,
    ipc_server: &Arc<IpcServer>,
) {
    let (request_id, result) = match command {
        ClientCommand::GetSettings { request_id } => {
            let settings = store.settings().await;
            (request_id, to_json(&settings))
        }
        ClientCommand::UpdateSettings {
            request_id,
            settings,
        } => {
            let outcome = store
                .update(move |s| *s = settings)
                .await
                .map_err(anyhow::Error::from)
                .and_then(|updated| to_json(&updated));
            (request_id, outcome)
        }
        ClientCommand::GetLastReminder { request_id } => {
            let last = store.last_reminder().await;
            (request_id, to_json(&last))
        }
        ClientCommand::TriggerReminder { request_id } => {
            scheduler.trigger_now().await;
            (request_id, Ok(serde_json::Value::Null))
        }
    };

    let response = match result {
        Ok(data) => DaemonEvent::CommandResponse {
            request_id,
            success: true,
            message: None,
            data: Some(data),
        },
        Err(e) => DaemonEvent::CommandResponse {
            request_id,
            success: false,
            message: Some(format!("{e:#}")),
            data: None,
        },
    };
    ipc_server.broadcast_event(response);
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(anyhow::Error::from)
}
