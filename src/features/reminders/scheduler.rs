//! # Reminder Scheduler
//!
//! Maintains the minimum set of platform alarms needed to realize the
//! current notification settings, and decides at each fire whether a
//! reminder is actually delivered.
//!
//! One repeating alarm (`reminder-interval`) covers interval mode; one
//! one-shot alarm per configured daily time (`reminder-custom-<i>`) covers
//! custom-times mode, each re-registering itself for the next day after it
//! fires. Rebuilds always clear first, so the registered alarm set is fully
//! determined by the settings and repeated rebuilds converge.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 2.0.0: Capabilities injected (alarms, store, corpus, display, clock)
//! - 1.2.0: Custom-time alarms renew through quiet hours
//! - 1.1.0: Quiet-hours suppression at fire time
//! - 1.0.0: Initial interval scheduling

use chrono::{DateTime, Duration, Local};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::core::clock::{Clock, SystemClock};
use crate::features::corpus::{pick_uniform, Corpus, ReminderPayload};
use crate::features::display::DisplaySurface;
use crate::features::reminders::settings::{
    is_quiet_time, next_occurrence, parse_clock_time, NotificationSettings,
};
use crate::platform::alarms::{AlarmSchedule, AlarmScheduler};
use crate::store::{SettingsChange, SettingsStore};

/// Name of the repeating interval alarm
pub const INTERVAL_ALARM: &str = "reminder-interval";

/// Prefix of one-shot custom-time alarms; the suffix is the index into
/// `custom_times`
pub const CUSTOM_ALARM_PREFIX: &str = "reminder-custom-";

/// Payload selection strategy; uniform random in production
type Picker = Box<dyn Fn(&[ReminderPayload]) -> Option<ReminderPayload> + Send + Sync>;

/// The notification scheduling engine
pub struct ReminderScheduler {
    alarms: Arc<dyn AlarmScheduler>,
    store: Arc<SettingsStore>,
    corpus: Arc<Corpus>,
    display: Arc<dyn DisplaySurface>,
    clock: Arc<dyn Clock>,
    picker: Picker,
}

impl ReminderScheduler {
    pub fn new(
        alarms: Arc<dyn AlarmScheduler>,
        store: Arc<SettingsStore>,
        corpus: Arc<Corpus>,
        display: Arc<dyn DisplaySurface>,
    ) -> Self {
        ReminderScheduler {
            alarms,
            store,
            corpus,
            display,
            clock: Arc::new(SystemClock),
            picker: Box::new(pick_uniform),
        }
    }

    /// Replace the wall clock (tests pin time to exact instants)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the payload picker (tests assert exact delivery)
    pub fn with_picker(mut self, picker: Picker) -> Self {
        self.picker = picker;
        self
    }

    /// Clear every alarm of this component and register the set the given
    /// settings call for. Safe to call with nothing registered; calling it
    /// twice with the same settings ends in the same alarm set as once.
    ///
    /// Registration failures are logged and the remaining registrations
    /// still attempted; the next settings change rebuilds from scratch
    /// anyway.
    pub async fn rebuild_schedule(&self, settings: &NotificationSettings) {
        if let Err(e) = self.alarms.clear_all().await {
            warn!("Failed to clear existing alarms: {e:#}");
        }

        if !settings.enabled {
            info!("Reminders disabled, no alarms registered");
            return;
        }

        let now = self.clock.now();
        let mut registered = 0usize;

        if settings.wants_interval() {
            if settings.interval_minutes == 0 {
                warn!("Skipping interval alarm: interval_minutes must be at least 1");
            } else {
                let period = Duration::minutes(i64::from(settings.interval_minutes));
                match self
                    .alarms
                    .create(INTERVAL_ALARM, AlarmSchedule::repeating(period))
                    .await
                {
                    Ok(()) => registered += 1,
                    Err(e) => warn!("Failed to register {INTERVAL_ALARM}: {e:#}"),
                }
            }
        }

        if settings.wants_custom_times() {
            for (index, raw) in settings.custom_times.iter().enumerate() {
                let time = match parse_clock_time(raw) {
                    Ok(t) => t,
                    Err(e) => {
                        warn!("Skipping custom time #{index}: {e}");
                        continue;
                    }
                };
                let name = format!("{CUSTOM_ALARM_PREFIX}{index}");
                let when = next_occurrence(time, now);
                match self.alarms.create(&name, AlarmSchedule::once_at(when)).await {
                    Ok(()) => {
                        debug!("Registered {name} for {when}");
                        registered += 1;
                    }
                    Err(e) => warn!("Failed to register {name}: {e:#}"),
                }
            }
        }

        info!(
            "Rebuilt reminder schedule: {registered} alarms (mode: {:?})",
            settings.mode
        );
    }

    /// React to a settings change. Only timing-relevant fields trigger a
    /// rebuild; cosmetic changes keep in-flight timers running.
    pub async fn on_settings_changed(&self, change: &SettingsChange) {
        if change.old.timing_changed(&change.new) {
            debug!("Timing-relevant settings changed, rebuilding schedule");
            self.rebuild_schedule(&change.new).await;
        } else {
            debug!("Settings change is cosmetic, keeping current alarms");
        }
    }

    /// Handle a fired alarm. Foreign alarm names are ignored. Custom-time
    /// alarms re-register their next occurrence whether or not the fire is
    /// suppressed, so the daily schedule self-perpetuates through quiet
    /// hours.
    pub async fn on_alarm_fired(&self, alarm_name: &str, now: DateTime<Local>) {
        if alarm_name != INTERVAL_ALARM && !alarm_name.starts_with(CUSTOM_ALARM_PREFIX) {
            debug!("Ignoring foreign alarm {alarm_name:?}");
            return;
        }

        let settings = self.store.settings().await;
        if !settings.enabled {
            debug!("Reminders disabled, dropping fire from {alarm_name}");
            return;
        }

        if let Some(index_raw) = alarm_name.strip_prefix(CUSTOM_ALARM_PREFIX) {
            self.renew_custom_alarm(alarm_name, index_raw, &settings, now)
                .await;
        }

        if self.is_quiet(&settings, now) {
            info!("Suppressing reminder from {alarm_name}: inside quiet hours");
            return;
        }

        self.deliver(now).await;
    }

    /// Deliver one reminder immediately, bypassing quiet hours. Backs the
    /// manual "test reminder" command.
    pub async fn trigger_now(&self) {
        let now = self.clock.now();
        self.deliver(now).await;
    }

    fn is_quiet(&self, settings: &NotificationSettings, now: DateTime<Local>) -> bool {
        match (
            parse_clock_time(&settings.quiet_start),
            parse_clock_time(&settings.quiet_end),
        ) {
            (Ok(start), Ok(end)) => is_quiet_time(now.time(), start, end),
            _ => {
                warn!(
                    "Unparseable quiet window {:?}..{:?}, treating as not quiet",
                    settings.quiet_start, settings.quiet_end
                );
                false
            }
        }
    }

    /// Re-register a fired one-shot alarm for its next daily occurrence.
    /// Computed from the fire instant, so delivery delays do not accumulate
    /// into drift.
    async fn renew_custom_alarm(
        &self,
        alarm_name: &str,
        index_raw: &str,
        settings: &NotificationSettings,
        now: DateTime<Local>,
    ) {
        let index: usize = match index_raw.parse() {
            Ok(i) => i,
            Err(_) => {
                debug!("Ignoring malformed custom alarm name {alarm_name:?}");
                return;
            }
        };

        let raw = match settings.custom_times.get(index) {
            Some(r) => r,
            None => {
                debug!("Custom time #{index} no longer configured, not renewing");
                return;
            }
        };

        let time = match parse_clock_time(raw) {
            Ok(t) => t,
            Err(e) => {
                warn!("Not renewing {alarm_name}: {e}");
                return;
            }
        };

        let when = next_occurrence(time, now);
        match self.alarms.create(alarm_name, AlarmSchedule::once_at(when)).await {
            Ok(()) => debug!("Renewed {alarm_name} for {when}"),
            Err(e) => warn!("Failed to renew {alarm_name}: {e:#}"),
        }
    }

    /// Pick a payload and hand it to the display surface. A failed display
    /// is logged and dropped; the next scheduled fire produces another
    /// attempt.
    async fn deliver(&self, now: DateTime<Local>) {
        let payload = match (self.picker)(self.corpus.payloads()) {
            Some(p) => p,
            None => {
                debug!("Reminder corpus is empty, skipping fire");
                return;
            }
        };

        if let Err(e) = self.display.display(&payload).await {
            warn!("Failed to display reminder {}: {e:#}", payload.id);
            return;
        }

        if let Err(e) = self.store.record_fired(&payload, now).await {
            warn!("Failed to record last reminder: {e:#}");
        }

        info!("Delivered reminder {} ({})", payload.id, payload.reference);
    }
}
