//! Structured logging configuration.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// Configurable via the `RUST_LOG` env var; defaults to `info`, with `sqlx`
/// and `hyper` quieted to `warn` since both are chatty at `info`.
///
/// # Example
///
/// ```no_run
/// use room_poker_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    // room_poker logs through `log`; bridge it into this tracing subscriber
    // so a room's coordinator/registry messages land in the same output.
    tracing_log::LogTracer::init().expect("LogTracer can only be installed once");

    tracing::info!("structured logging initialized");
}
