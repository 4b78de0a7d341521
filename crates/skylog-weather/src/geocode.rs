//! Location resolution via Nominatim (OpenStreetMap) - free, no API key required.
//!
//! Free text goes through forward search; `"lat, lon"` input is taken as
//! coordinates and only reverse geocoded for a display name.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::retry::{with_retry, RetryConfig};
use crate::types::{Location, WeatherError};

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<NominatimAddress>,
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state_district: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// Short place name such as "Seattle, Washington".
    fn short_name(self) -> Option<String> {
        // Capture state/country before the place chain consumes them
        let state = self.state.clone();
        let country = self.country.clone();

        let place = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.state_district)
            .or(self.county)
            .or(self.state)
            .or(self.country)?;

        let suffix = state
            .filter(|s| !s.is_empty() && *s != place)
            .or_else(|| country.filter(|c| !c.is_empty() && *c != place));

        Some(match suffix {
            Some(s) => format!("{}, {}", place, s),
            None => place,
        })
    }
}

/// Parse `"lat, lon"` into a coordinate pair.
///
/// Both parts must be numbers within the valid latitude/longitude ranges;
/// anything else (e.g. "Portland, OR") is treated as a place name.
pub fn parse_coordinates(text: &str) -> Option<(f64, f64)> {
    let (lat, lon) = text.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;

    let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
    valid.then_some((lat, lon))
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

impl Geocoder {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Resolve user input (place name or coordinates) to a [`Location`].
    pub async fn resolve(&self, text: &str) -> Result<Location, WeatherError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WeatherError::EmptyLocation);
        }

        match parse_coordinates(text) {
            Some((latitude, longitude)) => {
                let display_name = match self.reverse(latitude, longitude).await {
                    Ok(Some(name)) => name,
                    Ok(None) => text.to_string(),
                    Err(e) => {
                        tracing::debug!("Reverse geocode failed, keeping input text: {}", e);
                        text.to_string()
                    }
                };
                Ok(Location {
                    latitude,
                    longitude,
                    display_name,
                })
            }
            None => self.search(text).await,
        }
    }

    /// Forward geocode a place name; the best match wins.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, query: &str) -> Result<Location, WeatherError> {
        let url = format!("{}/search", self.base_url);
        let response = with_retry(&self.retry, || {
            self.client
                .get(&url)
                .query(&[("q", query), ("format", "json"), ("limit", "1")])
                .send()
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("geocoding response: {}", e)))?;

        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(query.to_string()))?;

        let latitude = hit
            .lat
            .parse()
            .map_err(|_| WeatherError::Parse(format!("latitude '{}'", hit.lat)))?;
        let longitude = hit
            .lon
            .parse()
            .map_err(|_| WeatherError::Parse(format!("longitude '{}'", hit.lon)))?;

        tracing::info!("Geocoded '{}' to {}", query, hit.display_name);
        Ok(Location {
            latitude,
            longitude,
            display_name: hit.display_name,
        })
    }

    /// Reverse geocode coordinates to a human-readable place name.
    ///
    /// `Ok(None)` means the service had nothing for these coordinates.
    #[instrument(skip(self), level = "debug")]
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>, WeatherError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let response = with_retry(&self.retry, || {
            self.client
                .get(&url)
                .query(&[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("format", "json"),
                    ("addressdetails", "1"),
                    ("zoom", "10"),
                ])
                .send()
        })
        .await?;

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return Ok(None);
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("reverse geocoding response: {}", e)))?;

        let name = body
            .address
            .and_then(NominatimAddress::short_name)
            .or(body.display_name);

        if let Some(ref n) = name {
            tracing::info!("Reverse geocoded to: {}", n);
        }
        Ok(name)
    }
}
