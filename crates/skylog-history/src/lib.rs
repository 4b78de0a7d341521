//! Saved weather searches: SQLite storage, async client and export.

pub mod backend;
pub mod client;
pub mod export;
pub mod record;
pub mod store;

pub use backend::{HistoryBackend, HistoryError, HistoryResult, MAX_LOCATION_LENGTH};
pub use client::HistoryClient;
pub use export::{export, export_to_file, ExportFormat};
pub use record::{NewSearch, SearchRecord, SearchUpdate, SAVED_AT_FORMAT};
pub use store::SqliteHistoryStore;
