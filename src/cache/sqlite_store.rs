//! SQLite store for the cached feed
//!
//! The snapshot lives in two related tables: a single `feed_cache` row holding
//! the timestamp, which owns the `feed_image` rows. A `position` column keeps
//! the feed in insertion order. Every write runs inside one transaction, so a
//! failed insert or delete leaves the previous snapshot untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use url::Url;
use uuid::Uuid;

use super::store::{
    CacheSnapshot, CachedFeed, DeletionCompletion, FeedStore, InsertionCompletion,
    LocalFeedImage, RetrievalCompletion, StoreError,
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS feed_cache (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        timestamp TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS feed_image (
        cache_id INTEGER NOT NULL REFERENCES feed_cache(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        id TEXT NOT NULL,
        description TEXT,
        location TEXT,
        url TEXT NOT NULL,
        PRIMARY KEY (cache_id, position)
    );
";

/// The only cache row id; a store holds at most one snapshot
const CACHE_ID: i64 = 1;

/// A feed image row as read from the database, before validation
struct ImageRow {
    id: String,
    description: Option<String>,
    location: Option<String>,
    url: String,
}

impl TryFrom<ImageRow> for LocalFeedImage {
    type Error = StoreError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Decoding(format!("invalid image id {:?}: {}", row.id, e)))?;
        let url = Url::parse(&row.url)
            .map_err(|e| StoreError::Decoding(format!("invalid image url {:?}: {}", row.url, e)))?;

        Ok(LocalFeedImage {
            id,
            description: row.description,
            location: row.location,
            url,
        })
    }
}

/// Stores the cached feed in a SQLite database
///
/// The connection sits behind a mutex so the store is `Sync`, but the
/// intended use is still behind a [`SerialFeedStore`](super::SerialFeedStore)
/// so operations keep their submission order.
pub struct SqliteFeedStore {
    /// Database file, or `None` for an in-memory database
    path: Option<PathBuf>,
    connection: Mutex<Connection>,
}

impl SqliteFeedStore {
    /// Opens (or creates) the database at `path`
    ///
    /// The schema is created by the first insert or delete, so a file that
    /// turns out not to be a database is reported by `retrieve` like any other
    /// corrupt cache instead of failing here. Retrieval never writes.
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let connection = Connection::open(&path)?;
        Ok(Self {
            path: Some(path),
            connection: Mutex::new(connection),
        })
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Ok(Self {
            path: None,
            connection: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> Result<CachedFeed, StoreError> {
        let connection = self.connection();
        let decoding = |e: rusqlite::Error| StoreError::Decoding(e.to_string());

        // No table means nothing was ever written.
        let initialized: bool = connection
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'feed_cache')",
                [],
                |row| row.get(0),
            )
            .map_err(decoding)?;
        if !initialized {
            return Ok(CachedFeed::Empty);
        }

        let timestamp: Option<String> = connection
            .query_row(
                "SELECT timestamp FROM feed_cache WHERE id = ?1",
                params![CACHE_ID],
                |row| row.get(0),
            )
            .optional()
            .map_err(decoding)?;

        let Some(timestamp) = timestamp else {
            return Ok(CachedFeed::Empty);
        };

        let timestamp = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| StoreError::Decoding(format!("invalid cache timestamp {:?}: {}", timestamp, e)))?
            .with_timezone(&Utc);

        let mut statement = connection
            .prepare(
                "SELECT id, description, location, url FROM feed_image
                 WHERE cache_id = ?1 ORDER BY position",
            )
            .map_err(decoding)?;

        let rows = statement
            .query_map(params![CACHE_ID], |row| {
                Ok(ImageRow {
                    id: row.get(0)?,
                    description: row.get(1)?,
                    location: row.get(2)?,
                    url: row.get(3)?,
                })
            })
            .map_err(decoding)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decoding)?;

        let feed = rows
            .into_iter()
            .map(LocalFeedImage::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CachedFeed::Found(CacheSnapshot { feed, timestamp }))
    }

    fn write(&self, feed: &[LocalFeedImage], timestamp: DateTime<Utc>) -> rusqlite::Result<()> {
        let mut connection = self.connection();
        connection.execute_batch(SCHEMA)?;

        let tx = connection.transaction()?;
        tx.execute("DELETE FROM feed_image", [])?;
        tx.execute("DELETE FROM feed_cache", [])?;
        tx.execute(
            "INSERT INTO feed_cache (id, timestamp) VALUES (?1, ?2)",
            params![CACHE_ID, timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)],
        )?;
        {
            let mut statement = tx.prepare(
                "INSERT INTO feed_image (cache_id, position, id, description, location, url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, image) in feed.iter().enumerate() {
                statement.execute(params![
                    CACHE_ID,
                    position as i64,
                    image.id.to_string(),
                    image.description,
                    image.location,
                    image.url.as_str(),
                ])?;
            }
        }
        tx.commit()
    }

    fn clear(connection: &mut Connection) -> rusqlite::Result<()> {
        connection.execute_batch(SCHEMA)?;
        let tx = connection.transaction()?;
        tx.execute("DELETE FROM feed_image", [])?;
        tx.execute("DELETE FROM feed_cache", [])?;
        tx.commit()
    }

    fn remove(&self) -> Result<(), StoreError> {
        let mut connection = self.connection();
        let error = match Self::clear(&mut connection) {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };

        let unreadable = matches!(
            error.sqlite_error_code(),
            Some(ErrorCode::NotADatabase) | Some(ErrorCode::DatabaseCorrupt)
        );
        match (&self.path, unreadable) {
            (Some(path), true) => {
                tracing::info!(path = %path.display(), "Replacing unreadable cache database");
                Self::recreate(&mut connection, path)
            }
            _ => Err(StoreError::Deletion(error.to_string())),
        }
    }

    /// Throws away an unreadable database file and starts an empty one in its place
    fn recreate(connection: &mut Connection, path: &Path) -> Result<(), StoreError> {
        let placeholder = Connection::open_in_memory().map_err(deletion_error)?;
        let stale = std::mem::replace(connection, placeholder);
        if let Err((_, e)) = stale.close() {
            return Err(deletion_error(e));
        }

        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(deletion_error(e)),
        }

        *connection = Connection::open(path).map_err(deletion_error)?;
        connection.execute_batch(SCHEMA).map_err(deletion_error)
    }
}

fn deletion_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Deletion(e.to_string())
}

impl FeedStore for SqliteFeedStore {
    fn delete_cached_feed(&self, completion: DeletionCompletion) {
        completion(self.remove());
    }

    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
        completion: InsertionCompletion,
    ) {
        let result = self
            .write(&feed, timestamp)
            .map_err(|e| StoreError::Insertion(e.to_string()));
        if let Err(ref e) = result {
            tracing::debug!(error = %e, "Cache database write failed");
        }
        completion(result);
    }

    fn retrieve(&self, completion: RetrievalCompletion) {
        completion(self.read());
    }
}
