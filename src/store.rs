//! # Settings Store
//!
//! Durable JSON-document store for user preferences and last-fired
//! bookkeeping. Missing file or missing keys fall back to defaults, so a
//! fresh install starts with reminders disabled and the standard quiet
//! window. Writers persist atomically (write-temp-then-rename) and every
//! settings change is broadcast to subscribers.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Atomic persistence via temp-file rename
//! - 1.1.0: Added last-reminder bookkeeping for click-through retrieval
//! - 1.0.0: Initial JSON document store with change broadcasts

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

use crate::features::corpus::ReminderPayload;
use crate::features::reminders::NotificationSettings;

/// Capacity of the settings-change broadcast channel
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Errors from reading or writing the settings document
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The last reminder that was actually delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastReminder {
    pub payload: ReminderPayload,
    pub fired_at: DateTime<Local>,
}

/// Everything persisted to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    notifications: NotificationSettings,
    #[serde(default)]
    last_reminder: Option<LastReminder>,
}

/// A settings change, broadcast to subscribers after persistence
#[derive(Debug, Clone)]
pub struct SettingsChange {
    pub old: NotificationSettings,
    pub new: NotificationSettings,
}

/// JSON-file-backed settings store with change notifications
pub struct SettingsStore {
    path: PathBuf,
    state: RwLock<SettingsDocument>,
    change_tx: broadcast::Sender<SettingsChange>,
}

impl SettingsStore {
    /// Open the store at `path`, falling back to defaults when the file is
    /// missing. An unreadable or corrupt document is logged and replaced by
    /// defaults on the next write rather than taking the daemon down.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<SettingsDocument>(&raw) {
                Ok(doc) => {
                    debug!("Loaded settings from {}", path.display());
                    doc
                }
                Err(e) => {
                    warn!(
                        "Settings file {} is corrupt ({e}), starting from defaults",
                        path.display()
                    );
                    SettingsDocument::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file at {}, using defaults", path.display());
                SettingsDocument::default()
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(SettingsStore {
            path,
            state: RwLock::new(state),
            change_tx,
        })
    }

    /// Current notification settings (defaults merged)
    pub async fn settings(&self) -> NotificationSettings {
        self.state.read().await.notifications.clone()
    }

    /// Last delivered reminder, if any fire has been recorded
    pub async fn last_reminder(&self) -> Option<LastReminder> {
        self.state.read().await.last_reminder.clone()
    }

    /// Subscribe to settings changes
    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.change_tx.subscribe()
    }

    /// Apply a mutation to the settings, persist, and notify subscribers.
    /// No notification is sent when the mutation leaves settings unchanged.
    pub async fn update<F>(&self, mutate: F) -> Result<NotificationSettings, StoreError>
    where
        F: FnOnce(&mut NotificationSettings),
    {
        let mut state = self.state.write().await;
        let old = state.notifications.clone();
        mutate(&mut state.notifications);
        let new = state.notifications.clone();

        if new == old {
            return Ok(new);
        }

        self.persist(&state)?;
        drop(state);

        // Receivers may not exist yet (daemon still starting); that is fine
        let _ = self.change_tx.send(SettingsChange {
            old,
            new: new.clone(),
        });
        Ok(new)
    }

    /// Record a delivered reminder for later retrieval. Bookkeeping only,
    /// so no change notification goes out.
    pub async fn record_fired(
        &self,
        payload: &ReminderPayload,
        fired_at: DateTime<Local>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.last_reminder = Some(LastReminder {
            payload: payload.clone(),
            fired_at,
        });
        self.persist(&state)
    }

    /// Write the document atomically: serialize to a sibling temp file,
    /// then rename over the target.
    fn persist(&self, state: &SettingsDocument) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!("Persisted settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::ReminderMode;
    use crate::features::corpus::PayloadKind;

    fn sample_payload() -> ReminderPayload {
        ReminderPayload {
            id: "verse-test".to_string(),
            kind: PayloadKind::Verse,
            text: "text".to_string(),
            translation: "translation".to_string(),
            reference: "Qur'an 1:1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();

        let settings = store.settings().await;
        assert!(!settings.enabled);
        assert_eq!(settings.interval_minutes, 60);
        assert_eq!(settings.quiet_start, "22:00");
        assert_eq!(settings.quiet_end, "07:00");
        assert!(store.last_reminder().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_keys_merge_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"notifications":{"enabled":true,"mode":"both"}}"#).unwrap();

        let store = SettingsStore::open(&path).unwrap();
        let settings = store.settings().await;
        assert!(settings.enabled);
        assert_eq!(settings.mode, ReminderMode::Both);
        assert_eq!(settings.interval_minutes, 60);
        assert_eq!(settings.quiet_end, "07:00");
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::open(&path).unwrap();
        assert!(!store.settings().await.enabled);
    }

    #[tokio::test]
    async fn test_update_persists_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::open(&path).unwrap();
        let mut changes = store.subscribe();

        store
            .update(|s| {
                s.enabled = true;
                s.interval_minutes = 30;
            })
            .await
            .unwrap();

        let change = changes.try_recv().unwrap();
        assert!(!change.old.enabled);
        assert!(change.new.enabled);
        assert_eq!(change.new.interval_minutes, 30);

        // Reopen from disk and confirm the write survived
        let reopened = SettingsStore::open(&path).unwrap();
        assert!(reopened.settings().await.enabled);
        assert_eq!(reopened.settings().await.interval_minutes, 30);
    }

    #[tokio::test]
    async fn test_noop_update_sends_no_notification() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        let mut changes = store.subscribe();

        store.update(|_| {}).await.unwrap();
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_record_fired_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::open(&path).unwrap();

        let fired_at = Local::now();
        store.record_fired(&sample_payload(), fired_at).await.unwrap();

        let reopened = SettingsStore::open(&path).unwrap();
        let last = reopened.last_reminder().await.unwrap();
        assert_eq!(last.payload.id, "verse-test");
        assert_eq!(last.fired_at, fired_at);
    }
}
