//! # Alarm Service
//!
//! Thin policy-free wrapper over the host's timer facility: register a
//! named alarm with an absolute instant, a relative delay, or a repeat
//! period, and receive fires over a channel. Creating an alarm under an
//! existing name replaces it; clearing removes everything at once so the
//! scheduler can rebuild from scratch without stale survivors.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Same-name create now replaces the running alarm task
//! - 1.0.0: Initial Tokio-task-backed implementation

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local};
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the fired-alarm channel
const FIRE_CHANNEL_CAPACITY: usize = 64;

/// When and how often an alarm fires
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmSchedule {
    /// Absolute instant of the first fire
    pub when: Option<DateTime<Local>>,
    /// Relative delay until the first fire (ignored when `when` is set)
    pub delay: Option<Duration>,
    /// Repeat period; absent for one-shot alarms
    pub period: Option<Duration>,
}

impl AlarmSchedule {
    /// One-shot alarm at an absolute instant
    pub fn once_at(when: DateTime<Local>) -> Self {
        AlarmSchedule {
            when: Some(when),
            delay: None,
            period: None,
        }
    }

    /// Repeating alarm; the first fire comes a full period after creation
    pub fn repeating(period: Duration) -> Self {
        AlarmSchedule {
            when: None,
            delay: Some(period),
            period: Some(period),
        }
    }

    pub fn is_repeating(&self) -> bool {
        self.period.is_some()
    }
}

/// A fired alarm, delivered to the daemon event loop
#[derive(Debug, Clone)]
pub struct AlarmFired {
    pub name: String,
    pub at: DateTime<Local>,
}

/// Platform scheduling primitive
#[async_trait]
pub trait AlarmScheduler: Send + Sync + 'static {
    /// Register an alarm, replacing any existing alarm with the same name
    async fn create(&self, name: &str, schedule: AlarmSchedule) -> Result<()>;

    /// Remove every registered alarm
    async fn clear_all(&self) -> Result<()>;
}

/// Production alarm service: one spawned task per alarm
pub struct TokioAlarms {
    tasks: DashMap<String, JoinHandle<()>>,
    fire_tx: mpsc::Sender<AlarmFired>,
}

impl TokioAlarms {
    /// Create the service and the receiving end of the fire channel
    pub fn new() -> (Arc<Self>, mpsc::Receiver<AlarmFired>) {
        let (fire_tx, fire_rx) = mpsc::channel(FIRE_CHANNEL_CAPACITY);
        let alarms = Arc::new(TokioAlarms {
            tasks: DashMap::new(),
            fire_tx,
        });
        (alarms, fire_rx)
    }

    /// Time until the first fire, clamped to zero for instants in the past
    fn initial_sleep(schedule: &AlarmSchedule) -> std::time::Duration {
        let delta = if let Some(when) = schedule.when {
            when.signed_duration_since(Local::now())
        } else if let Some(delay) = schedule.delay {
            delay
        } else if let Some(period) = schedule.period {
            period
        } else {
            Duration::zero()
        };
        delta.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}

#[async_trait]
impl AlarmScheduler for TokioAlarms {
    async fn create(&self, name: &str, schedule: AlarmSchedule) -> Result<()> {
        if let Some((_, old)) = self.tasks.remove(name) {
            old.abort();
        }

        let fire_tx = self.fire_tx.clone();
        let alarm_name = name.to_string();
        let initial = Self::initial_sleep(&schedule);
        let period = schedule.period.and_then(|p| p.to_std().ok());

        debug!(
            "Registered alarm {alarm_name} (first fire in {initial:?}, repeating: {})",
            schedule.is_repeating()
        );

        let handle = tokio::spawn(async move {
            tokio::time::sleep(initial).await;
            loop {
                let fired = AlarmFired {
                    name: alarm_name.clone(),
                    at: Local::now(),
                };
                if fire_tx.send(fired).await.is_err() {
                    debug!("Fire channel closed, stopping alarm {alarm_name}");
                    return;
                }
                match period {
                    Some(p) => tokio::time::sleep(p).await,
                    None => return,
                }
            }
        });

        self.tasks.insert(name.to_string(), handle);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        let count = self.tasks.len();
        self.tasks.retain(|_, handle| {
            handle.abort();
            false
        });
        if count > 0 {
            debug!("Cleared {count} alarms");
        }
        Ok(())
    }
}
