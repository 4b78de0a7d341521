//! SQLite-based search history.
//!
//! One `searches` table; dates are stored as `YYYY-MM-DD` text and the save
//! time as fixed-width RFC 3339 so text ordering matches time ordering.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::backend::{validate_fields, HistoryBackend, HistoryError, HistoryResult};
use crate::record::{NewSearch, SearchRecord, SearchUpdate};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "SELECT id, location, lat, lon, start_date, end_date, temp, \
     feels_like, humidity, weather_desc, wind_speed, timestamp FROM searches";

/// SQLite-based search history storage.
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    /// Open (or create) the history database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> HistoryResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        tracing::debug!("Opened search history at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> HistoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> HistoryResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS searches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                location TEXT NOT NULL,
                lat REAL NOT NULL,
                lon REAL NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                temp REAL NOT NULL,
                feels_like REAL NOT NULL,
                humidity INTEGER NOT NULL,
                weather_desc TEXT NOT NULL,
                wind_speed REAL NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_searches_timestamp ON searches(timestamp DESC);
            "#,
        )?;
        Ok(())
    }

    fn parse_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
        let text: String = row.get(idx)?;
        NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<SearchRecord> {
        let saved_at_str: String = row.get(11)?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;

        Ok(SearchRecord {
            id: row.get(0)?,
            location: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            start_date: Self::parse_date(row, 4)?,
            end_date: Self::parse_date(row, 5)?,
            temperature: row.get(6)?,
            feels_like: row.get(7)?,
            humidity: row.get(8)?,
            description: row.get(9)?,
            wind_speed: row.get(10)?,
            saved_at,
        })
    }

    fn date_text(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Number of saved searches.
    pub fn count(&self) -> HistoryResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM searches", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn insert(&self, search: &NewSearch, saved_at: DateTime<Utc>) -> HistoryResult<SearchRecord> {
        validate_fields(&search.location, search.start_date, search.end_date)?;

        // Stored with microsecond precision; the returned record must match.
        let saved_at = saved_at.trunc_subsecs(6);
        let location = search.location.trim().to_string();
        self.conn.execute(
            r#"
            INSERT INTO searches (location, lat, lon, start_date, end_date, temp,
                                  feels_like, humidity, weather_desc, wind_speed, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                location,
                search.latitude,
                search.longitude,
                Self::date_text(search.start_date),
                Self::date_text(search.end_date),
                search.temperature,
                search.feels_like,
                search.humidity,
                search.description,
                search.wind_speed,
                saved_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Saved search {} for '{}'", id, location);

        Ok(SearchRecord {
            id,
            location,
            latitude: search.latitude,
            longitude: search.longitude,
            start_date: search.start_date,
            end_date: search.end_date,
            temperature: search.temperature,
            feels_like: search.feels_like,
            humidity: search.humidity,
            description: search.description.clone(),
            wind_speed: search.wind_speed,
            saved_at,
        })
    }
}

impl HistoryBackend for SqliteHistoryStore {
    fn list(&self) -> HistoryResult<Vec<SearchRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY timestamp DESC, id DESC", SELECT_COLUMNS))?;

        let rows = stmt.query_map([], Self::row_to_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get(&self, id: i64) -> HistoryResult<Option<SearchRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn create(&self, search: &NewSearch) -> HistoryResult<SearchRecord> {
        self.insert(search, Utc::now())
    }

    fn update(&self, id: i64, update: &SearchUpdate) -> HistoryResult<SearchRecord> {
        validate_fields(&update.location, update.start_date, update.end_date)?;

        let mut record = self.get(id)?.ok_or(HistoryError::NotFound(id))?;
        record.location = update.location.trim().to_string();
        record.start_date = update.start_date;
        record.end_date = update.end_date;

        self.conn.execute(
            "UPDATE searches SET location = ?1, start_date = ?2, end_date = ?3 WHERE id = ?4",
            params![
                record.location,
                Self::date_text(record.start_date),
                Self::date_text(record.end_date),
                id,
            ],
        )?;

        tracing::debug!("Updated search {}", id);
        Ok(record)
    }

    fn delete(&self, id: i64) -> HistoryResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM searches WHERE id = ?1", params![id])?;

        if removed == 0 {
            return Err(HistoryError::NotFound(id));
        }

        tracing::debug!("Deleted search {}", id);
        Ok(())
    }

    fn is_empty(&self) -> HistoryResult<bool> {
        Ok(self.count()? == 0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::TimeZone;

    fn create_test_store() -> SqliteHistoryStore {
        SqliteHistoryStore::in_memory().expect("Failed to create in-memory store")
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn new_search(location: &str) -> NewSearch {
        NewSearch {
            location: location.to_string(),
            latitude: 48.8566,
            longitude: 2.3522,
            start_date: d(10),
            end_date: d(12),
            temperature: 11.5,
            feels_like: 10.2,
            humidity: 66,
            description: "scattered clouds".to_string(),
            wind_speed: 4.1,
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = create_test_store();

        let saved = store.create(&new_search("Paris")).unwrap();
        assert!(saved.id > 0);

        let fetched = store.get(saved.id).unwrap().unwrap();
        assert_eq!(fetched.location, "Paris");
        assert_eq!(fetched.start_date, d(10));
        assert_eq!(fetched.end_date, d(12));
        assert_eq!(fetched.humidity, 66);
        assert_eq!(fetched.description, "scattered clouds");
        assert_eq!(fetched.saved_at, saved.saved_at);
    }

    #[test]
    fn test_location_is_trimmed() {
        let store = create_test_store();
        let saved = store.create(&new_search("  Paris ")).unwrap();
        assert_eq!(saved.location, "Paris");
        assert_eq!(store.get(saved.id).unwrap().unwrap().location, "Paris");
    }

    #[test]
    fn test_list_newest_first() {
        let store = create_test_store();
        let base = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        store.insert(&new_search("Older"), base).unwrap();
        store
            .insert(&new_search("Newest"), base + chrono::Duration::hours(2))
            .unwrap();
        store
            .insert(&new_search("Middle"), base + chrono::Duration::hours(1))
            .unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|r| r.location).collect();
        assert_eq!(names, vec!["Newest", "Middle", "Older"]);
    }

    #[test]
    fn test_same_timestamp_orders_by_id() {
        let store = create_test_store();
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        let first = store.insert(&new_search("First"), at).unwrap();
        let second = store.insert(&new_search("Second"), at).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_update() {
        let store = create_test_store();
        let saved = store.create(&new_search("Paris")).unwrap();

        let updated = store
            .update(
                saved.id,
                &SearchUpdate {
                    location: "Lyon".to_string(),
                    start_date: d(1),
                    end_date: d(3),
                },
            )
            .unwrap();
        assert_eq!(updated.location, "Lyon");
        assert_eq!(updated.temperature, saved.temperature);

        let fetched = store.get(saved.id).unwrap().unwrap();
        assert_eq!(fetched.location, "Lyon");
        assert_eq!(fetched.start_date, d(1));
        assert_eq!(fetched.end_date, d(3));
        assert_eq!(fetched.saved_at, saved.saved_at);
    }

    #[test]
    fn test_update_nonexistent() {
        let store = create_test_store();
        let result = store.update(
            999,
            &SearchUpdate {
                location: "Lyon".to_string(),
                start_date: d(1),
                end_date: d(3),
            },
        );
        assert!(matches!(result, Err(HistoryError::NotFound(999))));
    }

    #[test]
    fn test_update_invalid_fields() {
        let store = create_test_store();
        let saved = store.create(&new_search("Paris")).unwrap();

        let result = store.update(
            saved.id,
            &SearchUpdate {
                location: "   ".to_string(),
                start_date: d(1),
                end_date: d(3),
            },
        );
        assert!(matches!(result, Err(HistoryError::Validation(_))));

        let result = store.update(
            saved.id,
            &SearchUpdate {
                location: "Lyon".to_string(),
                start_date: d(5),
                end_date: d(3),
            },
        );
        assert!(matches!(result, Err(HistoryError::Validation(_))));
        assert_eq!(store.get(saved.id).unwrap().unwrap().location, "Paris");
    }

    #[test]
    fn test_created_timestamp_matches_stored() {
        let store = create_test_store();

        for _ in 0..20 {
            let saved = store.create(&new_search("Paris")).unwrap();
            let fetched = store.get(saved.id).unwrap().unwrap();
            assert_eq!(fetched.saved_at, saved.saved_at);
        }

        let odd = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let saved = store.insert(&new_search("Nice"), odd).unwrap();
        assert_eq!(saved.saved_at.timestamp_subsec_nanos(), 123_456_000);
        assert_eq!(store.get(saved.id).unwrap().unwrap().saved_at, saved.saved_at);
    }

    #[test]
    fn test_create_invalid() {
        let store = create_test_store();
        let result = store.create(&new_search(""));
        assert!(matches!(result, Err(HistoryError::Validation(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_delete() {
        let store = create_test_store();
        let saved = store.create(&new_search("Paris")).unwrap();

        store.delete(saved.id).unwrap();
        assert!(store.get(saved.id).unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_delete_nonexistent() {
        let store = create_test_store();
        assert!(matches!(store.delete(42), Err(HistoryError::NotFound(42))));
    }

    #[test]
    fn test_count() {
        let store = create_test_store();
        assert_eq!(store.count().unwrap(), 0);

        store.create(&new_search("Paris")).unwrap();
        store.create(&new_search("Rome")).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let store = create_test_store();
        store
            .conn
            .execute(
                "INSERT INTO searches (location, lat, lon, start_date, end_date, temp, feels_like, \
                 humidity, weather_desc, wind_speed, timestamp) \
                 VALUES ('Bad', 0, 0, 'yesterday', '2025-03-10', 0, 0, 0, '', 0, 'now')",
                [],
            )
            .unwrap();

        assert!(matches!(store.list(), Err(HistoryError::Database(_))));
    }
}
