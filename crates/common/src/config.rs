//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recognition thresholds and hold timings.
    pub recognition: RecognitionConfig,

    /// Message channel between recognition and dispatch.
    pub transport: TransportConfig,

    /// Action execution backends.
    pub dispatcher: DispatcherConfig,

    /// Display geometry override.
    pub display: DisplayConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Tunables for the landmark → gesture pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Required continuous hold before POINTING is confirmed (ms).
    pub hold_pointing_ms: f64,
    /// Required continuous hold before CLOSED_FIST is confirmed (ms).
    pub hold_closed_fist_ms: f64,
    /// Required continuous hold before OPEN_PALM is confirmed (ms).
    pub hold_open_palm_ms: f64,
    /// Required continuous hold before PINCH is confirmed (ms).
    pub hold_pinch_ms: f64,
    /// Required continuous hold before SPREAD is confirmed (ms).
    pub hold_spread_ms: f64,
    /// Hold for any other label (ms).
    pub hold_default_ms: f64,

    /// Horizontal palm velocity that triggers a swipe (normalized units/sec).
    pub swipe_velocity: f64,
    /// Minimum time between two swipes (ms).
    pub swipe_cooldown_ms: f64,

    /// Minimum interval between pointer messages (ms).
    pub pointer_interval_ms: f64,

    /// Thumb-index distance (relative to hand scale) below which a pinch is reported.
    pub pinch_threshold: f64,
    /// Thumb-index distance (relative to hand scale) above which a spread is reported.
    pub spread_threshold: f64,
}

/// Transport endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Address the dispatcher listens on and the recognizer connects to.
    pub address: String,

    /// Minimum delay between reconnect attempts from the recognizer (ms).
    pub reconnect_interval_ms: u64,

    /// Upper bound on one connection attempt (ms).
    pub connect_timeout_ms: u64,

    /// Upper bound on writing one message; a stalled peer is dropped (ms).
    pub send_timeout_ms: u64,
}

/// Executor tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Try the native input-injection tier at startup.
    pub native_enabled: bool,

    /// Persistent helper process (tier 2). `None` disables the tier.
    pub helper: Option<ExternalCommand>,

    /// One-shot automation interpreter (tier 3). `None` disables the tier.
    pub script: Option<ExternalCommand>,

    /// Retry a failed call on the next resolved tier instead of only logging it.
    pub escalate_on_failure: bool,
}

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Display size override; detection is used when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "gestureflow_dispatcher=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            hold_pointing_ms: 600.0,
            hold_closed_fist_ms: 800.0,
            hold_open_palm_ms: 1000.0,
            hold_pinch_ms: 200.0,
            hold_spread_ms: 200.0,
            hold_default_ms: 150.0,
            swipe_velocity: 0.8,
            swipe_cooldown_ms: 400.0,
            pointer_interval_ms: 33.0,
            pinch_threshold: 0.22,
            spread_threshold: 0.45,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3001".to_string(),
            reconnect_interval_ms: 2000,
            connect_timeout_ms: 1000,
            send_timeout_ms: 200,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            native_enabled: true,
            helper: Some(ExternalCommand {
                program: "powershell".to_string(),
                args: vec![
                    "-NoProfile".to_string(),
                    "-NonInteractive".to_string(),
                    "-File".to_string(),
                    "ps_handler.ps1".to_string(),
                ],
            }),
            script: Some(ExternalCommand {
                program: "powershell".to_string(),
                args: vec![
                    "-NoProfile".to_string(),
                    "-NonInteractive".to_string(),
                    "-Command".to_string(),
                ],
            }),
            escalate_on_failure: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &std::path::Path) -> crate::error::GestureflowResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("gestureflow").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let raw = r#"{ "transport": { "address": "0.0.0.0:4000" }, "dispatcher": { "helper": null } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.transport.address, "0.0.0.0:4000");
        assert_eq!(config.transport.reconnect_interval_ms, 2000);
        assert_eq!(config.transport.send_timeout_ms, 200);
        assert!(config.dispatcher.helper.is_none());
        assert!(config.dispatcher.script.is_some());
        assert!(!config.dispatcher.escalate_on_failure);
        assert_eq!(config.recognition.hold_closed_fist_ms, 800.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = std::env::temp_dir().join("gestureflow_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(AppConfig::load_from(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
