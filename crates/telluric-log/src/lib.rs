//! Structured logging for the telluric crates.
//!
//! Library crates only emit `tracing` events; binaries call [`init_logging`]
//! once at startup to install a console layer and, in debug builds, a JSON
//! file layer for post-mortem analysis.

use std::path::Path;

use telluric_config::Config;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives used when neither `RUST_LOG` nor the config sets a level.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Name of the JSON log file written under the log directory.
pub const LOG_FILE: &str = "telluric.log";

/// Filter directives for `config`: its `debug.log_level`, or the default.
pub fn filter_directives(config: Option<&Config>) -> &str {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => &config.debug.log_level,
        _ => DEFAULT_DIRECTIVES,
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the config's log level. The console layer prints
/// uptime, target and thread name (worker threads are named). When
/// `debug_build` is set and `log_dir` is writable, events are also written
/// as JSON to [`LOG_FILE`] there.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(fmt::time::uptime())
            .json();

        return subscriber.with(file_layer).try_init();
    }

    subscriber.try_init()
}

/// An `EnvFilter` with [`DEFAULT_DIRECTIVES`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_DIRECTIVES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_directives_follow_config() {
        let mut config = Config::default();
        config.debug.log_level = "debug,telluric_noise=trace".to_string();
        assert_eq!(filter_directives(Some(&config)), "debug,telluric_noise=trace");

        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_DIRECTIVES);
        assert_eq!(filter_directives(None), DEFAULT_DIRECTIVES);
    }

    #[test]
    fn test_crate_filters_parse() {
        for directives in [
            "info",
            "warn,telluric_terrain=debug",
            "error,telluric_sampler=trace,telluric_noise=debug",
        ] {
            assert!(
                EnvFilter::try_new(directives).is_ok(),
                "Failed to parse filter: {directives}"
            );
        }
    }

    #[test]
    fn test_second_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        let first = init_logging(Some(dir.path()), true, None);
        assert!(init_logging(None, false, None).is_err());
        if first.is_ok() {
            assert!(dir.path().join(LOG_FILE).exists());
        }
    }
}
