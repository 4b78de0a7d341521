//! History storage trait and error types.

use skylog_core::{DatabaseError, RusqliteErrorExt};
use thiserror::Error;

use crate::record::{NewSearch, SearchRecord, SearchUpdate};

/// Errors from history storage and export.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Search not found: {0}")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("No saved searches to export")]
    NothingToExport,

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for HistoryError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.into_database_error())
    }
}

impl HistoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(id) => format!("No saved search with ID {}.", id),
            Self::Validation(msg) => msg.clone(),
            Self::Database(e) => e.user_message().to_string(),
            Self::NothingToExport => "No data to export.".to_string(),
            Self::Export(_) => "Export failed. Please try again.".to_string(),
            Self::Io(_) => "A file operation failed. Check the output path.".to_string(),
            Self::Task(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// Storage for saved searches.
///
/// Implementations don't need to be Sync; `HistoryClient` serializes access.
pub trait HistoryBackend: Send {
    /// All searches, newest first.
    fn list(&self) -> HistoryResult<Vec<SearchRecord>>;

    /// A search by ID, `None` if absent.
    fn get(&self, id: i64) -> HistoryResult<Option<SearchRecord>>;

    /// Save a new search.
    ///
    /// # Errors
    /// `Validation` if the location is blank or too long, or start > end.
    fn create(&self, search: &NewSearch) -> HistoryResult<SearchRecord>;

    /// Replace the location and date range of a saved search.
    ///
    /// # Errors
    /// `NotFound` if the ID doesn't exist, `Validation` as for `create`.
    fn update(&self, id: i64, update: &SearchUpdate) -> HistoryResult<SearchRecord>;

    /// # Errors
    /// `NotFound` if the ID doesn't exist.
    fn delete(&self, id: i64) -> HistoryResult<()>;

    fn is_empty(&self) -> HistoryResult<bool> {
        Ok(self.list()?.is_empty())
    }
}

/// Maximum stored location length in characters.
pub const MAX_LOCATION_LENGTH: usize = 200;

/// Validate the user-editable fields shared by create and update.
pub fn validate_fields(
    location: &str,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
) -> HistoryResult<()> {
    if location.trim().is_empty() {
        return Err(HistoryError::validation("Location cannot be empty"));
    }

    if location.chars().count() > MAX_LOCATION_LENGTH {
        return Err(HistoryError::validation(format!(
            "Location exceeds maximum length of {} characters",
            MAX_LOCATION_LENGTH
        )));
    }

    if start_date > end_date {
        return Err(HistoryError::validation(
            "Start date cannot be after the end date",
        ));
    }

    Ok(())
}
