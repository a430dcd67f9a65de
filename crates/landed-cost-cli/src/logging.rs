use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialise stderr logging. Level comes from `RUST_LOG`, default `warn`,
/// so stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
