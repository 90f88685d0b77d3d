use tracing_subscriber::filter::EnvFilter;

/// Level for the library and binary targets at a given `-v` count.
fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr subscriber. `RUST_LOG`, when set, replaces the `-v` filter.
pub fn setup_trace(verbose: u8) {
    let level = level(verbose);
    let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,admcentroid={level},{crate_name}={level}")));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
