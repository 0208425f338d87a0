//! Diagnostic logging for the `autofix` binary.
//!
//! The binary has two output channels. The operator report (the icon-prefixed
//! progress lines and the final fix/error summary written by
//! [`crate::reporter::Console`]) owns stdout, so it can be piped or captured
//! by CI untouched. Everything emitted through `tracing` (lifecycle events,
//! suppressed command failures, runner diagnostics) goes to stderr.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` overrides `level` when set. With `json`, each event is one
/// JSON object per line, for CI log collectors. A subscriber that is already
/// installed is left in place.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let diagnostics = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let diagnostics = if json {
        diagnostics.json().boxed()
    } else {
        diagnostics.boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(diagnostics)
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_ignored() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
        tracing::info!(event = "telemetry.test", "still logging");
    }
}
