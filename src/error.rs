//! Top-level error type for the command line.

use skylog_core::ConfigError;
use skylog_history::HistoryError;
use skylog_weather::{ValidationError, WeatherError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Invalid date range: {0}")]
    DateRange(#[from] ValidationError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Wrap a config load failure, keeping its full context chain.
    pub fn invalid_config(err: impl std::fmt::Display) -> Self {
        AppError::Config(ConfigError::Invalid(format!("{:#}", err)))
    }

    /// Message shown to the user; details stay in the log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Input(msg) => msg.clone(),
            AppError::DateRange(e) => e.user_message().to_string(),
            AppError::Weather(e) => e.user_message().to_string(),
            AppError::History(e) => e.user_message(),
            AppError::Config(ConfigError::Invalid(detail)) => {
                format!("Invalid configuration: {}", detail)
            }
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
