//! # Display Surfaces
//!
//! Each surface receives a fired reminder at most once per non-suppressed
//! fire. Delivery is best-effort: a failing surface is logged and the fire
//! dropped, never retried.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: Fanout surface with per-surface failure isolation
//! - 1.0.0: Log and IPC surfaces

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

use crate::features::corpus::ReminderPayload;
use crate::ipc::{DaemonEvent, IpcServer};

/// Renders one fired reminder
#[async_trait]
pub trait DisplaySurface: Send + Sync + 'static {
    /// Surface name used in logs
    fn name(&self) -> &'static str;

    /// Render the payload; invoked at most once per non-suppressed fire
    async fn display(&self, payload: &ReminderPayload) -> Result<()>;
}

/// Writes the reminder to the structured log. The daemon's headless
/// fallback when no front-end is connected.
pub struct LogDisplay;

#[async_trait]
impl DisplaySurface for LogDisplay {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn display(&self, payload: &ReminderPayload) -> Result<()> {
        info!("Reminder: {}", payload.text);
        info!("  {} ({})", payload.translation, payload.reference);
        Ok(())
    }
}

/// Broadcasts the reminder to all connected front-end clients
pub struct IpcDisplay {
    server: Arc<IpcServer>,
}

impl IpcDisplay {
    pub fn new(server: Arc<IpcServer>) -> Self {
        IpcDisplay { server }
    }
}

#[async_trait]
impl DisplaySurface for IpcDisplay {
    fn name(&self) -> &'static str {
        "ipc"
    }

    async fn display(&self, payload: &ReminderPayload) -> Result<()> {
        let receivers = self.server.broadcast_event(DaemonEvent::ReminderFired {
            payload: payload.clone(),
            fired_at: chrono::Local::now(),
        });
        if receivers == 0 {
            // No front-end connected; the reminder still counts as shown
            // because the log surface or a later GetLastReminder covers it
            info!("No IPC clients connected for reminder {}", payload.id);
        }
        Ok(())
    }
}

/// Delivers to every configured surface, isolating failures so one broken
/// surface cannot starve the others
pub struct FanoutDisplay {
    surfaces: Vec<Arc<dyn DisplaySurface>>,
}

impl FanoutDisplay {
    pub fn new(surfaces: Vec<Arc<dyn DisplaySurface>>) -> Self {
        FanoutDisplay { surfaces }
    }
}

#[async_trait]
impl DisplaySurface for FanoutDisplay {
    fn name(&self) -> &'static str {
        "fanout"
    }

    async fn display(&self, payload: &ReminderPayload) -> Result<()> {
        let mut delivered = 0usize;
        for surface in &self.surfaces {
            match surface.display(payload).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Display surface {} failed: {e:#}", surface.name()),
            }
        }
        if delivered == 0 && !self.surfaces.is_empty() {
            bail!("every display surface failed");
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingDisplay;
    use super::*;
    use crate::features::corpus::PayloadKind;

    fn payload() -> ReminderPayload {
        ReminderPayload {
            id: "verse-test".to_string(),
            kind: PayloadKind::Verse,
            text: "text".to_string(),
            translation: "translation".to_string(),
            reference: "Qur'an 1:1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fanout_delivers_to_all() {
        let a = Arc::new(RecordingDisplay::new());
        let b = Arc::new(RecordingDisplay::new());
        let fanout =
            FanoutDisplay::new(vec![a.clone() as Arc<dyn DisplaySurface>, b.clone()]);

        fanout.display(&payload()).await.unwrap();
        assert_eq!(a.displayed().len(), 1);
        assert_eq!(b.displayed().len(), 1);
    }

    #[tokio::test]
    async fn test_fanout_tolerates_partial_failure() {
        let broken = Arc::new(RecordingDisplay::new());
        broken.fail_next();
        let working = Arc::new(RecordingDisplay::new());
        let fanout = FanoutDisplay::new(vec![
            broken.clone() as Arc<dyn DisplaySurface>,
            working.clone(),
        ]);

        fanout.display(&payload()).await.unwrap();
        assert!(broken.displayed().is_empty());
        assert_eq!(working.displayed().len(), 1);
    }

    #[tokio::test]
    async fn test_fanout_errors_when_all_fail() {
        let broken = Arc::new(RecordingDisplay::new());
        broken.fail_next();
        let fanout = FanoutDisplay::new(vec![broken as Arc<dyn DisplaySurface>]);

        assert!(fanout.display(&payload()).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_fanout_is_ok() {
        let fanout = FanoutDisplay::new(Vec::new());
        assert!(fanout.display(&payload()).await.is_ok());
    }
}
