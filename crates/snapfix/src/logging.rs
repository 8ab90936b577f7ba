use snapfix_static::EnvVars;
use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber filtered by `SNAPFIX_LOG`.
///
/// Does nothing when the variable is unset or another subscriber is already
/// installed, so a test harness can keep its own.
pub fn setup_tracing() {
    let Ok(directives) = std::env::var(EnvVars::SNAPFIX_LOG) else {
        return;
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
