//! # Notification Settings
//!
//! User preferences driving the reminder schedule, plus the wall-clock
//! helpers the scheduler leans on: `HH:MM` parsing, the quiet-hours
//! predicate, and next-occurrence computation for custom daily times.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Quiet window moved to fire-time evaluation (no longer a timing field)
//! - 1.1.0: Added "both" mode combining interval and custom times
//! - 1.0.0: Initial model with interval scheduling and quiet hours

use chrono::{DateTime, Duration, Local, LocalResult, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default reminder interval when none is configured
pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;

/// Default quiet window start
pub const DEFAULT_QUIET_START: &str = "22:00";

/// Default quiet window end
pub const DEFAULT_QUIET_END: &str = "07:00";

/// Which alarms realize the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMode {
    /// One repeating alarm every `interval_minutes`
    Interval,
    /// One one-shot alarm per entry in `custom_times`
    #[serde(rename = "custom")]
    CustomTimes,
    /// Interval and custom times together
    Both,
}

impl Default for ReminderMode {
    fn default() -> Self {
        ReminderMode::Interval
    }
}

/// User preferences for reminder delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: ReminderMode,
    /// Minutes between interval reminders; must be at least 1
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    /// Fixed daily clock times as "HH:MM" strings
    #[serde(default)]
    pub custom_times: Vec<String>,
    /// Start of the suppression window ("HH:MM")
    #[serde(default = "default_quiet_start")]
    pub quiet_start: String,
    /// End of the suppression window ("HH:MM"); a start greater than the
    /// end denotes an overnight window, equal bounds mean never quiet
    #[serde(default = "default_quiet_end")]
    pub quiet_end: String,
}

fn default_interval_minutes() -> u32 {
    DEFAULT_INTERVAL_MINUTES
}

fn default_quiet_start() -> String {
    DEFAULT_QUIET_START.to_string()
}

fn default_quiet_end() -> String {
    DEFAULT_QUIET_END.to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            enabled: false,
            mode: ReminderMode::default(),
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            custom_times: Vec::new(),
            quiet_start: default_quiet_start(),
            quiet_end: default_quiet_end(),
        }
    }
}

impl NotificationSettings {
    /// True when switching from `self` to `other` requires rebuilding the
    /// alarm set. Quiet hours are evaluated at fire time, so they do not
    /// count; resetting in-flight timers for them would lose progress
    /// toward the next fire.
    pub fn timing_changed(&self, other: &Self) -> bool {
        self.enabled != other.enabled
            || self.mode != other.mode
            || self.interval_minutes != other.interval_minutes
            || self.custom_times != other.custom_times
    }

    pub fn wants_interval(&self) -> bool {
        matches!(self.mode, ReminderMode::Interval | ReminderMode::Both)
    }

    pub fn wants_custom_times(&self) -> bool {
        matches!(self.mode, ReminderMode::CustomTimes | ReminderMode::Both)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsParseError {
    #[error("invalid clock time {0:?}, expected HH:MM")]
    InvalidClockTime(String),
}

/// Parse a 24-hour "HH:MM" wall-clock string
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, SettingsParseError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| SettingsParseError::InvalidClockTime(value.to_string()))
}

/// Quiet-hours predicate. Both window ends are inclusive; a window whose
/// start is after its end wraps midnight, and equal bounds mean the window
/// is empty.
pub fn is_quiet_time(now: NaiveTime, quiet_start: NaiveTime, quiet_end: NaiveTime) -> bool {
    if quiet_start == quiet_end {
        false
    } else if quiet_start < quiet_end {
        now >= quiet_start && now <= quiet_end
    } else {
        now >= quiet_start || now <= quiet_end
    }
}

/// Next occurrence of a daily clock time: today if still ahead of `now`,
/// otherwise tomorrow.
pub fn next_occurrence(time: NaiveTime, now: DateTime<Local>) -> DateTime<Local> {
    let mut candidate = now.date_naive().and_time(time);
    if candidate <= now.naive_local() {
        candidate = candidate + Duration::days(1);
    }
    resolve_local(candidate, now)
}

/// Map a naive local datetime onto the local timezone, tolerating DST
/// transitions: ambiguous times take the earlier offset, nonexistent times
/// shift one hour forward.
fn resolve_local(candidate: chrono::NaiveDateTime, now: DateTime<Local>) -> DateTime<Local> {
    match Local.from_local_datetime(&candidate) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => match Local.from_local_datetime(&(candidate + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => now + Duration::days(1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(value: &str) -> NaiveTime {
        parse_clock_time(value).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 15, h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(t("08:30"), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(t("00:00"), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(t("23:59"), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
        assert_eq!(t(" 07:15 "), NaiveTime::from_hms_opt(7, 15, 0).unwrap());

        assert!(parse_clock_time("24:00").is_err());
        assert!(parse_clock_time("12:60").is_err());
        assert!(parse_clock_time("12:30:15").is_err());
        assert!(parse_clock_time("8am").is_err());
        assert!(parse_clock_time("").is_err());
    }

    #[test]
    fn test_quiet_overnight_window() {
        let start = t("22:00");
        let end = t("07:00");

        assert!(is_quiet_time(t("23:30"), start, end));
        assert!(is_quiet_time(t("06:59"), start, end));
        assert!(is_quiet_time(t("22:00"), start, end));
        assert!(is_quiet_time(t("07:00"), start, end));
        assert!(!is_quiet_time(t("07:01"), start, end));
        assert!(!is_quiet_time(t("21:59"), start, end));
        assert!(!is_quiet_time(t("12:00"), start, end));
    }

    #[test]
    fn test_quiet_same_day_window() {
        let start = t("13:00");
        let end = t("14:00");

        assert!(is_quiet_time(t("13:30"), start, end));
        assert!(is_quiet_time(t("13:00"), start, end));
        assert!(is_quiet_time(t("14:00"), start, end));
        assert!(!is_quiet_time(t("12:59"), start, end));
        assert!(!is_quiet_time(t("14:01"), start, end));
    }

    #[test]
    fn test_quiet_zero_length_window_never_quiet() {
        let bound = t("09:00");
        assert!(!is_quiet_time(t("09:00"), bound, bound));
        assert!(!is_quiet_time(t("15:00"), bound, bound));
    }

    #[test]
    fn test_next_occurrence_today_when_still_ahead() {
        let now = at(10, 0);
        let next = next_occurrence(t("20:00"), now);
        assert_eq!(next, at(20, 0));
    }

    #[test]
    fn test_next_occurrence_tomorrow_when_passed() {
        let now = at(10, 0);
        let next = next_occurrence(t("08:00"), now);
        assert_eq!(next, at(8, 0) + Duration::days(1));
    }

    #[test]
    fn test_next_occurrence_exact_now_rolls_to_tomorrow() {
        let now = at(10, 0);
        let next = next_occurrence(t("10:00"), now);
        assert_eq!(next, now + Duration::days(1));
    }

    #[test]
    fn test_timing_changed() {
        let base = NotificationSettings {
            enabled: true,
            ..NotificationSettings::default()
        };

        let mut interval = base.clone();
        interval.interval_minutes = 30;
        assert!(base.timing_changed(&interval));

        let mut mode = base.clone();
        mode.mode = ReminderMode::Both;
        assert!(base.timing_changed(&mode));

        let mut times = base.clone();
        times.custom_times = vec!["08:00".to_string()];
        assert!(base.timing_changed(&times));

        let mut quiet = base.clone();
        quiet.quiet_start = "21:00".to_string();
        assert!(!base.timing_changed(&quiet));
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let settings: NotificationSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, NotificationSettings::default());
        assert!(!settings.enabled);
        assert_eq!(settings.interval_minutes, 60);
        assert_eq!(settings.quiet_start, "22:00");
        assert_eq!(settings.quiet_end, "07:00");
    }

    #[test]
    fn test_mode_serialization_names() {
        let json = serde_json::to_string(&ReminderMode::CustomTimes).unwrap();
        assert_eq!(json, r#""custom""#);
        assert_eq!(
            serde_json::from_str::<ReminderMode>(r#""both""#).unwrap(),
            ReminderMode::Both
        );
        assert_eq!(
            serde_json::from_str::<ReminderMode>(r#""interval""#).unwrap(),
            ReminderMode::Interval
        );
    }
}
