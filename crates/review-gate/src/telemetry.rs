use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Targets the configured level applies to. Everything else logs at `warn`.
const GATE_TARGETS: [&str; 2] = ["review_gate", "review_gate_demo"];

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { directives: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directives, .. } => {
                write!(f, "GATE_LOG_LEVEL produced an invalid filter '{directives}'")
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "a tracing subscriber is already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Expand a bare level such as `debug` into per-target directives for the gate
/// crates. Anything already shaped like a filter (`target=level`, lists) is kept.
pub fn gate_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    let mut directives = vec!["warn".to_string()];
    directives.extend(GATE_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = gate_directives(&config.log_level);
    EnvFilter::try_new(&directives)
        .map_err(|source| TelemetryError::InvalidFilter { directives, source })
}

/// Install the global fmt subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config)?)
        .with_target(true)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_gate_targets() {
        assert_eq!(
            gate_directives(" debug "),
            "warn,review_gate=debug,review_gate_demo=debug"
        );
    }

    #[test]
    fn explicit_directives_pass_through() {
        assert_eq!(
            gate_directives("review_gate::review=trace"),
            "review_gate::review=trace"
        );
        assert_eq!(gate_directives("info,hyper=off"), "info,hyper=off");
    }

    #[test]
    fn scoped_directives_parse_as_a_filter() {
        assert!(EnvFilter::try_new(gate_directives("info")).is_ok());
    }
}
