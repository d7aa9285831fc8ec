//! Logging setup
//!
//! Console logging through `tracing-subscriber`. `RUST_LOG` takes precedence
//! over the configured level.

use crate::error::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Levels accepted in configuration and on the command line
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Whether `level` names a known log level
pub fn is_valid_level(level: &str) -> bool {
    LOG_LEVELS.contains(&level.trim().to_lowercase().as_str())
}

/// Setup logging with the specified level
///
/// Installing a second subscriber in the same process is a no-op.
pub fn setup_logging(level: &str) -> Result<()> {
    if !is_valid_level(level) {
        return Err(Error::ConfigError(format!(
            "unknown log level '{}', expected one of {}",
            level,
            LOG_LEVELS.join(", ")
        )));
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.trim().to_lowercase()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .with(filter)
        .try_init()
        .ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_validation() {
        assert!(is_valid_level("info"));
        assert!(is_valid_level(" DEBUG "));
        assert!(!is_valid_level("verbose"));
    }

    #[test]
    fn test_setup_rejects_unknown_level() {
        assert!(matches!(setup_logging("loud"), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_setup_twice_is_harmless() {
        assert!(setup_logging("warn").is_ok());
        assert!(setup_logging("info").is_ok());
    }
}
