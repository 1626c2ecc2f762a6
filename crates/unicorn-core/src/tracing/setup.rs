//! Tracing initialization.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "UNICORN_LOG";

/// Filter used when `UNICORN_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str =
    "warn,unicorn_core=info,unicorn_analysis=info,unicorn_storage=info,unicorn_runner=info";

/// Installs the global subscriber. Later calls are no-ops.
///
/// `UNICORN_LOG=unicorn_analysis=debug,unicorn_storage=warn` style
/// directives select per-crate levels. Returns `false` when the host
/// process had already installed its own subscriber, which is kept.
pub fn init_tracing() -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
        match installed {
            Ok(()) => true,
            Err(e) => {
                // Reaches the host's subscriber.
                tracing::warn!(error = %e, env = LOG_ENV, "global subscriber already set, keeping it");
                false
            }
        }
    })
}
