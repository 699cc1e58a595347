use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; passing `debug`
/// raises it to `debug`. `RUST_LOG` can override the level only when
/// debug logging is enabled, so a stray environment variable cannot
/// make a regular run verbose.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
