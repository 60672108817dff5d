//=========================================================================
// Logging
//=========================================================================
//
// One-time `env_logger` setup behind the `log` facade.
//
// Filter precedence: explicit filter > `RUST_LOG` > default level.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Once;

use log::LevelFilter;

//=== LoggingConfig =======================================================

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax
/// (e.g. `"info"`, `"boxfall=debug,wgpu=warn"`).
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Default configuration at the given level.
    pub fn with_level(level: LevelFilter) -> Self {
        Self {
            default_level: level,
            ..Self::default()
        }
    }
}

//=== Initialization ======================================================

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match (config.env_filter, std::env::var("RUST_LOG")) {
            (Some(filter), _) => {
                builder.parse_filters(&filter);
            }
            (None, Ok(filter)) => {
                builder.parse_filters(&filter);
            }
            (None, Err(_)) => {
                builder
                    .filter_level(config.default_level)
                    // GPU backends are noisy below warn
                    .filter_module("wgpu_core", LevelFilter::Warn)
                    .filter_module("wgpu_hal", LevelFilter::Warn)
                    .filter_module("naga", LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);

        // A test harness may already have installed a logger
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_level_keeps_other_defaults() {
        let config = LoggingConfig::with_level(LevelFilter::Trace);
        assert_eq!(config.default_level, LevelFilter::Trace);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::with_level(LevelFilter::Trace));
    }
}
