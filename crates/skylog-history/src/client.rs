//! Async facade over the history backend.
//!
//! SQLite calls are blocking, so every operation runs on tokio's blocking
//! pool behind a shared mutex.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{HistoryBackend, HistoryError, HistoryResult};
use crate::export::{self, ExportFormat};
use crate::record::{NewSearch, SearchRecord, SearchUpdate};
use crate::store::SqliteHistoryStore;

/// Shared handle to search history.
#[derive(Clone)]
pub struct HistoryClient {
    backend: Arc<Mutex<dyn HistoryBackend>>,
}

impl HistoryClient {
    /// Wrap any backend.
    pub fn new<B: HistoryBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    /// Open the SQLite history at `path`.
    pub fn open(path: &Path) -> HistoryResult<Self> {
        Ok(Self::new(SqliteHistoryStore::new(path)?))
    }

    async fn run<T, F>(&self, op: F) -> HistoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn HistoryBackend) -> HistoryResult<T> + Send + 'static,
    {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || {
            let guard = backend.lock();
            op(&*guard)
        })
        .await
        .map_err(|e| HistoryError::Task(e.to_string()))?
    }

    /// All saved searches, newest first.
    pub async fn list(&self) -> HistoryResult<Vec<SearchRecord>> {
        self.run(|b| b.list()).await
    }

    /// A saved search by ID.
    ///
    /// # Errors
    /// `NotFound` if there is no such search.
    pub async fn get(&self, id: i64) -> HistoryResult<SearchRecord> {
        self.run(move |b| b.get(id)?.ok_or(HistoryError::NotFound(id)))
            .await
    }

    pub async fn create(&self, search: NewSearch) -> HistoryResult<SearchRecord> {
        self.run(move |b| b.create(&search)).await
    }

    pub async fn update(&self, id: i64, update: SearchUpdate) -> HistoryResult<SearchRecord> {
        self.run(move |b| b.update(id, &update)).await
    }

    pub async fn delete(&self, id: i64) -> HistoryResult<()> {
        self.run(move |b| b.delete(id)).await
    }

    /// Export every saved search to `path`, returning how many were written.
    pub async fn export_to_file(&self, format: ExportFormat, path: PathBuf) -> HistoryResult<usize> {
        self.run(move |b| {
            let records = b.list()?;
            export::export_to_file(&records, format, &path)?;
            Ok(records.len())
        })
        .await
    }
}
