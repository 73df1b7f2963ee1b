//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: Level,
    /// JSON lines instead of human readable output
    pub json: bool,
    /// Emit span open and close events
    pub span_events: bool,
    pub file_line: bool,
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
            thread_names: false,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            span_events: true,
            thread_names: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn production() -> Self {
        Self {
            json: true,
            file_line: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self::default(),
            Environment::Production => Self::production(),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber
///
/// # Errors
/// Returns `AlreadyInitialized` if a subscriber is already installed
pub fn try_init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let base = fmt::layer()
        .with_file(config.file_line)
        .with_line_number(config.file_line)
        .with_thread_names(config.thread_names)
        .with_span_events(config.span_events());

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry.with(base.json()).try_init()
    } else {
        registry.with(base).try_init()
    };
    result.map_err(|_| TracingError::AlreadyInitialized)
}

/// Install the global subscriber, ignoring a second initialization.
/// Used by binaries and tests that may run setup more than once.
pub fn init_tracing(config: &TracingConfig) {
    let _ = try_init_tracing(config);
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_presets() {
        let dev = TracingConfig::for_environment(Environment::Development);
        assert_eq!(dev.level, Level::DEBUG);
        assert!(dev.span_events);
        assert!(!dev.json);

        let prod = TracingConfig::for_environment(Environment::Production);
        assert_eq!(prod.level, Level::INFO);
        assert!(prod.json);
        assert!(!prod.file_line);
    }

    #[test]
    fn second_init_is_reported() {
        init_tracing(&TracingConfig::default());
        assert!(matches!(
            try_init_tracing(&TracingConfig::default()),
            Err(TracingError::AlreadyInitialized)
        ));
    }
}
