use std::io;

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, SysReportError};

const DEFAULT_TIME_PATTERN: &str =
    "[year]-[month]-[day]T[hour repr:24]:[minute]:[second]::[subsecond digits:4]";

/// Diagnostics go to stderr so the operator summary on stdout stays clean.
/// Verbosity follows `RUST_LOG`, `info` by default.
pub fn setup_logging() -> Result<()> {
    let time_format = time::format_description::parse_borrowed::<1>(DEFAULT_TIME_PATTERN).map_err(|e| {
        SysReportError::Logging(format!(
            "Failed to parse time format: {} with error: {}",
            DEFAULT_TIME_PATTERN, e
        ))
    })?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(UtcTime::new(time_format))
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| SysReportError::Logging(format!("Failed to setup logging with error: {}", e)))
}
