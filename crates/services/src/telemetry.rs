//! Tracing subscriber setup for hosts embedding the runner.
//!
//! - `LESSON_LOG` holds the filter directives (default `info,services=debug`).
//! - `LESSON_LOG_FORMAT=json` switches to structured JSON lines.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info,services=debug";

/// Install the global subscriber. Later calls are no-ops, so hosts and tests
/// may call this freely.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LESSON_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    let installed = match std::env::var("LESSON_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().try_init(),
        _ => builder.try_init(),
    };
    if installed.is_ok() {
        tracing::debug!("tracing initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_tracing();
        init_tracing();
    }
}
