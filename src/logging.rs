use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{HawkularError, Result};

/// Sets up the logging subscriber for the application.
///
/// # Arguments
/// * `json` - Emit JSON lines instead of the compact human format
pub fn init_logger(json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hawkular_datasource={}", Level::INFO)));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .with_ansi(true)
                    .compact(),
            )
            .try_init()
    };

    result.map_err(|e| HawkularError::Internal(format!("Failed to initialize logger: {}", e)))
}
