// Core layer - configuration and shared capabilities
pub mod core;

// Features layer - scheduling, corpus, display surfaces
pub mod features;

// IPC layer - communication between the daemon and front-end surfaces
pub mod ipc;

// Platform layer - alarm scheduling primitive
pub mod platform;

// Infrastructure - durable settings storage
pub mod store;

// Re-export core items for convenience
pub use crate::core::{Clock, Config, SystemClock};

// Re-export feature items
pub use features::{
    // Corpus
    Corpus, CorpusError, PayloadKind, ReminderPayload,
    // Display
    DisplaySurface, FanoutDisplay, IpcDisplay, LogDisplay,
    // Reminders
    NotificationSettings, ReminderMode, ReminderScheduler,
};

// Re-export IPC items
pub use ipc::{ClientCommand, DaemonEvent, IpcClient, IpcServer};

// Re-export platform and store items
pub use platform::{AlarmFired, AlarmSchedule, AlarmScheduler, TokioAlarms};
pub use store::{LastReminder, SettingsChange, SettingsStore};
