//! Weather lookups for Skylog.
//!
//! Date range validation and forecast aggregation are pure functions; the
//! geocoder (Nominatim) and provider (OpenWeatherMap) do the network work.

pub mod aggregate;
pub mod geocode;
pub mod provider;
pub mod retry;
pub mod types;
pub mod validate;

pub use aggregate::{aggregate, MAX_FORECAST_DAYS};
pub use geocode::{parse_coordinates, Geocoder};
pub use provider::WeatherProvider;
pub use retry::RetryConfig;
pub use types::*;
pub use validate::{validate, DateRange, ValidationError, DATE_FORMAT};
