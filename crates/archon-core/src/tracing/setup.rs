//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Archon tracing/logging system.
///
/// Reads the `ARCHON_LOG` environment variable for per-subsystem log levels.
/// Format: `ARCHON_LOG=archon_analysis::resolver=debug,archon_analysis::importer=info`
///
/// Falls back to `archon=info` if `ARCHON_LOG` is not set or is invalid.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("ARCHON_LOG").unwrap_or_else(|_| EnvFilter::new("archon=info"));

        // A host application may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
