//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default approach-detection parameters.
    pub tracking: TrackingDefaults,

    /// Output file settings.
    pub output: OutputDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default approach-detection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingDefaults {
    /// Ratio of target to previous-node distance at or below which the
    /// hand counts as approaching the target. Must lie in `(0.0, 0.5)`.
    pub approach_threshold: f64,

    /// Minimum number of frames spent approaching before a departure
    /// is accepted.
    pub approach_buffer: u32,
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDefaults {
    /// Suffix appended to the input file stem to name the result file.
    pub suffix: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "mocap_motion_core=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for TrackingDefaults {
    fn default() -> Self {
        Self {
            approach_threshold: 0.35,
            approach_buffer: 5,
        }
    }
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            suffix: "_events.csv".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Result file path for a given input: `<stem><suffix>` beside the input.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "motion".to_string());
        input.with_file_name(format!("{stem}{}", self.output.suffix))
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
    base.join("mocap-events").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!((config.tracking.approach_threshold - 0.35).abs() < 1e-12);
        assert_eq!(config.tracking.approach_buffer, 5);
        assert_eq!(config.output.suffix, "_events.csv");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let raw = r#"{ "tracking": { "approach_buffer": 8 } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.tracking.approach_buffer, 8);
        assert!((config.tracking.approach_threshold - 0.35).abs() < 1e-12);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("mocap-events-no-such-config.json");
        let config = AppConfig::load_from(&path);
        assert_eq!(config.tracking.approach_buffer, 5);
    }

    #[test]
    fn test_load_from_invalid_json_uses_defaults() {
        let path = std::env::temp_dir().join(format!(
            "mocap-events-bad-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.output.suffix, "_events.csv");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_path_for_input() {
        let config = AppConfig::default();
        let out = config.output_path_for(Path::new("/data/session/trial_03.tsv"));
        assert_eq!(out, PathBuf::from("/data/session/trial_03_events.csv"));
    }
}
