//! Tracing bootstrap for the review engine.

use crate::config::TelemetryConfig;
use std::env;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { directive: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directive, .. } => {
                write!(
                    f,
                    "log filter '{directive}' does not parse; use a level or a tracing directive"
                )
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "tracing subscriber failed to install: {err}")
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

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level so operators can raise verbosity without a config change, and a
/// malformed value is an error rather than a silent fallback.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match env::var("RUST_LOG") {
        Ok(directive) => parse_filter(&directive)?,
        Err(_) => parse_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_levels_and_directives_parse() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("lineops=debug,info").is_ok());
    }

    #[test]
    fn malformed_directive_is_rejected_with_its_text() {
        let err = parse_filter("foo=bar=baz").expect_err("malformed filter");
        assert!(err.to_string().contains("foo=bar=baz"));
    }
}
