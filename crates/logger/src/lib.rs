// Rust guideline compliant 2026-02-23

//! Ambient logging setup for the `eventum` binary.
//!
//! Library crates never touch this module: they emit through the `log`
//! facade (`log::{debug,info,warn,error}!`) like the rest of the
//! workspace. This crate only wires a process-wide `tracing-subscriber`
//! that renders those `log` records, via `tracing-log`'s bridge, with
//! `EnvFilter` directive support (`RUST_LOG=eventum=debug,renderer=info`
//! style filters).

use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Guard returned by [`init`]; dropping it is harmless, it exists only to
/// keep call sites symmetrical with crates that hand back a flush guard
/// (`tracing_appender::non_blocking`'s `WorkerGuard`, for instance).
#[derive(Debug)]
pub struct LoggerGuard(());

/// Install the process-wide subscriber: an `EnvFilter` read from
/// `RUST_LOG` (falling back to [`DEFAULT_FILTER`]) feeding a
/// `tracing_subscriber::fmt` layer, with `log` records bridged in through
/// `tracing_log`.
///
/// Safe to call more than once in the same process (tests, `#[tokio::test]`
/// bodies run in parallel): a subscriber already installed by an earlier
/// call is a no-op rather than an error, matching the teacher's graceful
/// "already installed" fallback.
pub fn init() -> LoggerGuard {
    if let Err(e) = tracing_log::LogTracer::init() {
        log::debug!("logger.bridge.already_installed: reason={e}");
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        log::debug!("logger.subscriber.already_installed: reason={e}");
    }

    LoggerGuard(())
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn init_is_idempotent() {
        let _a = init();
        let _b = init();
    }
}
