use tracing_subscriber::{filter::LevelFilter, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "energy_analytics=info";

/// Installs the global fmt subscriber. Other crates log at `warn` unless
/// `RUST_LOG` says otherwise.
pub fn init_tracing() {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    if let Ok(directive) = DEFAULT_DIRECTIVE.parse() {
        filter = filter.add_directive(directive);
    }

    // Reports are written to stdout.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
