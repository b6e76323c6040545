//! Logging setup for binaries

/// Load `.env` and install the fmt subscriber
///
/// `RUST_LOG` is honoured; without it only warnings are shown, or info-level
/// events when `verbose` is set.
pub fn init_tracing(verbose: bool) {
    dotenvy::dotenv().ok();

    let level = if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
