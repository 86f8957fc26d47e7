use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `-v` and `-vv` override `RUST_LOG`; without them
/// `RUST_LOG` applies, defaulting to warnings only.
pub fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
