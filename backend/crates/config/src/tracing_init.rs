use sprintpulse_common::error::{PulseError, PulseResult};
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` directives take precedence over the configured level.
/// An unparsable level falls back to `info`.
fn build_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber at `level` (usually `AppConfig::log_level`).
///
/// Events go to stderr; stdout is left for the report itself.
pub fn init_tracing(level: &str) -> PulseResult<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    fmt()
        .with_env_filter(build_filter(rust_log.as_deref(), level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| PulseError::Internal(format!("tracing init failed: {e}")))
}
