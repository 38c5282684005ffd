// Logging - Process-wide logger setup for the binary
// The library only uses the `log` facade; installing a logger is up to the host

use log::LevelFilter;

/// Install the env_logger backend
///
/// `RUST_LOG` overrides `default_level`. Calling this more than once keeps
/// the first logger.
pub fn init(default_level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();

    if result.is_ok() {
        log::debug!("Logger initialized at {}", default_level);
    }
}

/// Flush buffered log output before the process exits
pub fn shutdown() {
    log::logger().flush();
}
