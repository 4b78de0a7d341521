use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use skylog_core::{NetworkError, ReqwestErrorExt};

/// A resolved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Current weather conditions (metric units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Temperature in °C
    pub temperature: f64,
    /// Apparent temperature in °C
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Sea-level pressure in hPa
    pub pressure: u32,
    /// Wind speed in m/s
    pub wind_speed: f64,
    pub description: String,
}

/// One timestamped point of a multi-point forecast feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: NaiveDateTime,
    /// Temperature in °C
    pub temperature: f64,
    pub description: String,
}

/// Per-day rollup of forecast samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub description: String,
}

/// Weather and geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("No location given")]
    EmptyLocation,

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Weather API key is not configured")]
    MissingApiKey,

    #[error("Weather API rejected the API key")]
    InvalidApiKey,

    #[error("Rate limited by the weather service")]
    RateLimited,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}

impl WeatherError {
    /// User-facing message for terminal output.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::EmptyLocation => "Please enter a location.",
            Self::LocationNotFound(_) => "Location not found. Check and try again.",
            Self::MissingApiKey => "Please add your weather API key first.",
            Self::InvalidApiKey => "Weather API key is invalid. Check settings.",
            Self::RateLimited => "Too many weather requests. Please wait and try again.",
            Self::Api { status, .. } if *status >= 500 => {
                "Weather service unavailable. Please try again later."
            }
            Self::Api { .. } => "Weather service error. Please try again.",
            Self::Parse(_) => "Received unexpected weather data. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_delegates_to_network_error() {
        let err = WeatherError::from(NetworkError::Timeout);
        assert_eq!(err.user_message(), NetworkError::Timeout.user_message());
    }

    #[test]
    fn test_api_error_messages() {
        let upstream = WeatherError::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        let client = WeatherError::Api {
            status: 400,
            message: "wrong latitude".into(),
        };
        assert!(upstream.user_message().contains("unavailable"));
        assert!(client.user_message().contains("error"));
        assert!(client.to_string().contains("wrong latitude"));
    }

    #[test]
    fn test_missing_api_key_message() {
        assert!(WeatherError::MissingApiKey.user_message().contains("API key"));
    }
}
