use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "crud_harness=info";

/// Installs the fmt subscriber used by harness sessions.
///
/// `filter` wins over `RUST_LOG`. Only the first call in a process has an effect.
pub fn init_logging(filter: Option<&str>) {
    let _ = fmt()
        .with_env_filter(env_filter(filter))
        .with_test_writer()
        .with_target(true)
        .try_init();
}

fn env_filter(filter: Option<&str>) -> EnvFilter {
    match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}
