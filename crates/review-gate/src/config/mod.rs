use std::env;
use std::fmt;

use crate::review::{AttachmentPolicy, InvariantMode};

const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_ACCEPTED_TYPES: &str = "application/pdf,image/jpeg,image/png";

/// Distinguishes runtime behavior for different stages of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    fn default_invariant_mode(self) -> InvariantMode {
        match self {
            AppEnvironment::Production => InvariantMode::Heal,
            AppEnvironment::Development | AppEnvironment::Test => InvariantMode::Panic,
        }
    }
}

/// Top-level configuration for hosts embedding the review gate.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub gate: GateConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("GATE_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let max_bytes = match env::var("GATE_MAX_ATTACHMENT_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidAttachmentLimit(raw.clone()))?,
            Err(_) => DEFAULT_MAX_ATTACHMENT_BYTES,
        };

        let accepted_raw =
            env::var("GATE_ACCEPTED_TYPES").unwrap_or_else(|_| DEFAULT_ACCEPTED_TYPES.to_string());
        let accepted = parse_mime_list(&accepted_raw)?;

        let invariant_mode = match env::var("GATE_INVARIANT_MODE") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "panic" => InvariantMode::Panic,
                "heal" => InvariantMode::Heal,
                _ => return Err(ConfigError::InvalidInvariantMode(raw)),
            },
            Err(_) => environment.default_invariant_mode(),
        };

        let log_level = env::var("GATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            gate: GateConfig {
                attachments: AttachmentPolicy::new(max_bytes, accepted),
                invariant_mode,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_mime_list(raw: &str) -> Result<Vec<mime::Mime>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<mime::Mime>()
                .map_err(|_| ConfigError::InvalidMimeType(entry.to_string()))
        })
        .collect()
}

/// Settings every gate instance is constructed with.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub attachments: AttachmentPolicy,
    pub invariant_mode: InvariantMode,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            attachments: AttachmentPolicy::default(),
            invariant_mode: if cfg!(debug_assertions) {
                InvariantMode::Panic
            } else {
                InvariantMode::Heal
            },
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidAttachmentLimit(String),
    InvalidMimeType(String),
    InvalidInvariantMode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAttachmentLimit(raw) => {
                write!(f, "GATE_MAX_ATTACHMENT_BYTES must be a byte count, got '{raw}'")
            }
            ConfigError::InvalidMimeType(raw) => {
                write!(f, "GATE_ACCEPTED_TYPES contains an invalid MIME type '{raw}'")
            }
            ConfigError::InvalidInvariantMode(raw) => {
                write!(f, "GATE_INVARIANT_MODE must be 'panic' or 'heal', got '{raw}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("GATE_ENV");
        env::remove_var("GATE_LOG_LEVEL");
        env::remove_var("GATE_MAX_ATTACHMENT_BYTES");
        env::remove_var("GATE_ACCEPTED_TYPES");
        env::remove_var("GATE_INVARIANT_MODE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.gate.attachments.max_bytes(), 5 * 1024 * 1024);
        assert_eq!(config.gate.attachments.accepted().len(), 3);
        assert_eq!(config.gate.invariant_mode, InvariantMode::Panic);
    }

    #[test]
    fn production_defaults_to_healing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GATE_ENV", "prod");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.gate.invariant_mode, InvariantMode::Heal);
        reset_env();
    }

    #[test]
    fn rejects_malformed_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GATE_MAX_ATTACHMENT_BYTES", "five megs");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidAttachmentLimit(_))
        ));

        reset_env();
        env::set_var("GATE_ACCEPTED_TYPES", "application/pdf,not a mime");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidMimeType(_))
        ));

        reset_env();
        env::set_var("GATE_INVARIANT_MODE", "ignore");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidInvariantMode(_))
        ));
        reset_env();
    }
}
