//! Structured logging for the Stellar simulation.
//!
//! Console output goes through a `tracing` fmt layer with an uptime timer.
//! Debug builds can additionally write JSON lines to a file for post-run
//! analysis. The level comes from `RUST_LOG` when set, then from the
//! config's `debug.log_level`.

use std::path::Path;

use stellar_config::Config;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "info";

/// File name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "stellar.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - Directory for the JSON log file (only used when `debug_build`)
/// * `debug_build` - Enables the JSON file layer
/// * `config` - Supplies the log level when `RUST_LOG` is unset
///
/// Fails if a global subscriber is already installed.
///
/// ```no_run
/// use stellar_config::Config;
/// use stellar_log::init_logging;
///
/// let config = Config::default();
/// init_logging(None, false, Some(&config)).expect("logging already initialized");
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(false)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        return subscriber.with(file_layer).try_init();
    }

    subscriber.try_init()
}

/// The filter directive for `config`, falling back to [`DEFAULT_FILTER`]
/// when it is missing or blank.
pub fn filter_directive(config: Option<&Config>) -> String {
    config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
