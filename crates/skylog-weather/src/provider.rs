//! OpenWeatherMap client for current conditions and the 5 day / 3 hour forecast.

use chrono::NaiveDateTime;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use skylog_core::is_usable_api_key;
use tracing::instrument;

use crate::aggregate::aggregate;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{CurrentWeather, DailySummary, ForecastSample, Location, WeatherError};

/// Timestamp format of the forecast feed's `dt_txt` field.
const FEED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: ApiMain,
    weather: Vec<ApiCondition>,
    wind: ApiWind,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt_txt: String,
    main: ForecastMain,
    #[serde(default)]
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl ForecastEntry {
    fn into_sample(self) -> Result<ForecastSample, WeatherError> {
        let timestamp = NaiveDateTime::parse_from_str(&self.dt_txt, FEED_TIME_FORMAT)
            .map_err(|_| WeatherError::Parse(format!("forecast timestamp '{}'", self.dt_txt)))?;
        let description = self
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| {
                WeatherError::Parse(format!("forecast entry {} has no conditions", self.dt_txt))
            })?;

        Ok(ForecastSample {
            timestamp,
            temperature: self.main.temp,
            description,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    retry: RetryConfig,
}

impl WeatherProvider {
    /// Create a provider.
    ///
    /// # Errors
    /// `MissingApiKey` if `api_key` is blank or still the placeholder.
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, WeatherError> {
        let api_key = api_key.into();
        if !is_usable_api_key(&api_key) {
            return Err(WeatherError::MissingApiKey);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Current conditions at `location`.
    #[instrument(skip(self, location), fields(place = %location.display_name), level = "info")]
    pub async fn current(&self, location: &Location) -> Result<CurrentWeather, WeatherError> {
        let body: CurrentResponse = self.get_json("weather", location).await?;

        let description = body
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default();

        Ok(CurrentWeather {
            temperature: body.main.temp,
            feels_like: body.main.feels_like,
            humidity: body.main.humidity,
            pressure: body.main.pressure,
            wind_speed: body.wind.speed,
            description,
        })
    }

    /// Raw forecast samples at `location`, in feed order.
    ///
    /// # Errors
    /// `Parse` if any entry has a malformed timestamp or no conditions.
    #[instrument(skip(self, location), fields(place = %location.display_name), level = "info")]
    pub async fn forecast_samples(
        &self,
        location: &Location,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        let body: ForecastResponse = self.get_json("forecast", location).await?;
        let samples = body
            .list
            .into_iter()
            .map(ForecastEntry::into_sample)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Received {} forecast samples", samples.len());
        Ok(samples)
    }

    /// Daily forecast summaries at `location` (at most five days).
    pub async fn forecast(&self, location: &Location) -> Result<Vec<DailySummary>, WeatherError> {
        let samples = self.forecast_samples(location).await?;
        Ok(aggregate(&samples))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &Location,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let lat = location.latitude.to_string();
        let lon = location.longitude.to_string();

        let response = with_retry(&self.retry, || {
            self.client
                .get(&url)
                .query(&[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                ])
                .send()
        })
        .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)));
        }

        match status.as_u16() {
            401 => Err(WeatherError::InvalidApiKey),
            429 => Err(WeatherError::RateLimited),
            code => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorBody>(&text)
                    .ok()
                    .and_then(|b| b.message)
                    .unwrap_or(text);
                if code == 404 {
                    Err(WeatherError::LocationNotFound(message))
                } else {
                    Err(WeatherError::Api {
                        status: code,
                        message,
                    })
                }
            }
        }
    }
}
