use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "stockfolio=warn";
const VERBOSE_FILTER: &str = "stockfolio=debug";

/// Installs the stderr subscriber. `--verbose` wins over `RUST_LOG`.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
