//! Logger bootstrap for the headless runner and tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs `env_logger` as the global logger.
///
/// `verbose` lowers this crate's threshold to `debug`, which surfaces the
/// reservation protocol's decisions (clearance timeouts, spawn conflicts).
/// Everything else stays at `info`. `RUST_LOG` takes precedence over both.
pub fn init(verbose: bool) {
    let crate_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let default_filter = format!("info,{}={crate_level}", env!("CARGO_CRATE_NAME"));

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format_timestamp_millis();

    // A logger may already be installed when several tests initialise it.
    let _ = builder.try_init();
}
