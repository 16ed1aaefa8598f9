// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Logging setup

use quick_send_core::{AppError, AppSettings};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// RUST_LOG wins over the configured filter. Fails if a subscriber is
/// already installed or the configured filter does not parse.
pub fn init(settings: &AppSettings) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_filter).map_err(|e| {
            AppError::InvalidConfig(format!("Bad log filter '{}': {}", settings.log_filter, e))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| AppError::InvalidConfig(format!("Logging already initialized: {}", e)))?;

    tracing::info!("Starting Quick Send v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
