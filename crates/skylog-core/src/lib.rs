pub mod config;
pub mod error;

pub use config::{
    is_usable_api_key, Config, ConfigValidationError, GeocodingConfig, HistoryConfig, ValidationResult,
    WeatherConfig,
};
pub use error::{
    ConfigError, DatabaseError, NetworkError, ReqwestErrorExt, RusqliteErrorExt,
};

use anyhow::Result;

/// Initialize logging.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. "info") applies.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Skylog core initialized");
    Ok(())
}
