//! Search history record types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Display format for `saved_at` in listings and exports.
pub const SAVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One saved weather search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: i64,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Temperature in °C at lookup time
    pub temperature: f64,
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    pub description: String,
    /// Wind speed in m/s
    pub wind_speed: f64,
    pub saved_at: DateTime<Utc>,
}

impl SearchRecord {
    /// `saved_at` as "YYYY-MM-DD HH:MM:SS" (UTC).
    pub fn saved_at_text(&self) -> String {
        self.saved_at.format(SAVED_AT_FORMAT).to_string()
    }
}

/// A search to be saved; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSearch {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub description: String,
    pub wind_speed: f64,
}

/// Editable fields of a saved search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchUpdate {
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
