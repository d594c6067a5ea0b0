//! # Daemon Configuration
//!
//! Environment-driven configuration for the reminder daemon. All values
//! have working defaults so `tadhkird` starts with no environment at all;
//! a `.env` file is honored when present (loaded by the binary).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Added TADHKIR_LOG_DISPLAY toggle for the structured-log surface
//! - 1.0.0: Initial creation with settings and socket paths

use std::env;

/// Default location of the durable settings document
pub const DEFAULT_SETTINGS_PATH: &str = "tadhkir-settings.json";

/// Default Unix socket path for front-end clients
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/tadhkir.sock";

/// Runtime configuration for the daemon
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON settings document
    pub settings_path: String,
    /// Path of the IPC Unix socket
    pub socket_path: String,
    /// Whether fired reminders are also written to the log
    pub log_display: bool,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Self {
        Config {
            settings_path: env::var("TADHKIR_SETTINGS")
                .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string()),
            socket_path: env::var("TADHKIR_SOCKET")
                .unwrap_or_else(|_| DEFAULT_SOCKET_PATH.to_string()),
            log_display: env::var("TADHKIR_LOG_DISPLAY")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            log_level: env::var("TADHKIR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            settings_path: DEFAULT_SETTINGS_PATH.to_string(),
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            log_display: true,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.settings_path, DEFAULT_SETTINGS_PATH);
        assert_eq!(config.socket_path, DEFAULT_SOCKET_PATH);
        assert!(config.log_display);
    }
}
