//! Tracing subscriber initialization.
//!
//! Every log record is written as a single line through a non-blocking writer, so that records
//! emitted concurrently by many workers never interleave. The writer is drained by a background
//! thread; keep the returned [`LogFlusher`] alive until the program exits so buffered records are
//! flushed.
//!
//! The filter is read from `RUST_LOG` and falls back to `info` for the application and the
//! `conveyor` library.

use std::io;
use std::sync::Once;

use ::tracing::info;
use config::Environment;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    /// The runtime environment could not be determined.
    #[error("failed to determine runtime environment: {0}")]
    Environment(#[source] io::Error),

    /// The `log` crate bridge could not be installed.
    #[error("failed to install log bridge: {0}")]
    LogTracer(#[from] tracing_log::log::SetLoggerError),

    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Flushes buffered log records when dropped.
#[must_use = "dropping the flusher stops the background log writer"]
#[derive(Debug)]
pub struct LogFlusher {
    _guard: WorkerGuard,
}

/// Installs the global tracing subscriber for a binary named `app_name`.
///
/// In the dev environment records are rendered in a compact human-readable form, in prod they
/// are rendered as JSON lines.
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    let environment = Environment::load().map_err(TracingError::Environment)?;

    tracing_log::LogTracer::init()?;

    let (writer, guard) = tracing_appender::non_blocking(io::stdout());
    let filter = build_env_filter(app_name);

    match environment {
        Environment::Dev => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_names(true)
                .compact();
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
        Environment::Prod => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .json()
                .with_current_span(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
    }

    info!(app_name, %environment, "tracing initialized");

    Ok(LogFlusher { _guard: guard })
}

/// Installs a subscriber writing to the test harness output, at most once per process.
///
/// Safe to call from every test; later calls are no-ops.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        // Another test binary component may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}

/// Builds the filter from `RUST_LOG`, defaulting to `info` for the app and the library.
fn build_env_filter(app_name: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{app_name}=info,conveyor=info,warn")))
}
