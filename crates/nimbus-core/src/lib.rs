pub mod config;
pub mod error;
pub mod locale;

pub use config::{
    ApiConfig, Config, DefaultLocation, RetrySettings, SearchConfig, StorageConfig,
    ValidationResult, API_KEY_ENV,
};
pub use error::ErrorCategory;
pub use locale::{Locale, TextDirection};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init() -> Result<()> {
    if install_subscriber() {
        tracing::info!("Nimbus core initialized");
    } else {
        tracing::debug!("Tracing subscriber already installed; keeping it");
    }
    Ok(())
}

/// Returns false when a global subscriber was already set.
fn install_subscriber() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok()
}
