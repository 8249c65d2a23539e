//! JSON file store for the cached feed
//!
//! Persists the snapshot as one JSON document, `{"feed": [...], "timestamp": ...}`,
//! at a configurable path. Writes go to a sibling temp file that is renamed
//! over the target, so a failed insert never leaves a half-written cache.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::store::{
    CacheSnapshot, CachedFeed, DeletionCompletion, FeedStore, InsertionCompletion,
    LocalFeedImage, RetrievalCompletion, StoreError,
};

/// On-disk layout of the cache file
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    /// The cached feed, in insertion order
    feed: Vec<CodableFeedImage>,
    /// When the feed was cached
    timestamp: DateTime<Utc>,
}

/// On-disk layout of a single feed image
#[derive(Debug, Serialize, Deserialize)]
struct CodableFeedImage {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    url: Url,
}

impl From<LocalFeedImage> for CodableFeedImage {
    fn from(image: LocalFeedImage) -> Self {
        Self {
            id: image.id,
            description: image.description,
            location: image.location,
            url: image.url,
        }
    }
}

impl From<CodableFeedImage> for LocalFeedImage {
    fn from(image: CodableFeedImage) -> Self {
        Self {
            id: image.id,
            description: image.description,
            location: image.location,
            url: image.url,
        }
    }
}

/// Stores the cached feed as a JSON file
///
/// Operations complete before returning. The store is not safe under
/// concurrent access from several threads; wrap it in a
/// [`SerialFeedStore`](super::SerialFeedStore).
#[derive(Debug, Clone)]
pub struct FileFeedStore {
    /// Where the cache document lives
    store_path: PathBuf,
}

impl FileFeedStore {
    /// Creates a store backed by the file at `store_path`
    ///
    /// Nothing is touched on disk until the first operation.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    /// Path of the temp file a new document is staged in before the rename
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .store_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.store_path.with_file_name(name)
    }

    /// Ensures the directory holding the cache file exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        match self.store_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    fn read(&self) -> Result<CachedFeed, StoreError> {
        let content = match fs::read(&self.store_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CachedFeed::Empty),
            Err(e) => return Err(StoreError::Decoding(e.to_string())),
        };

        let cache: CacheFile =
            serde_json::from_slice(&content).map_err(|e| StoreError::Decoding(e.to_string()))?;

        Ok(CachedFeed::Found(CacheSnapshot {
            feed: cache.feed.into_iter().map(LocalFeedImage::from).collect(),
            timestamp: cache.timestamp,
        }))
    }

    fn write(&self, feed: Vec<LocalFeedImage>, timestamp: DateTime<Utc>) -> Result<(), StoreError> {
        let cache = CacheFile {
            feed: feed.into_iter().map(CodableFeedImage::from).collect(),
            timestamp,
        };

        let json =
            serde_json::to_vec(&cache).map_err(|e| StoreError::Insertion(e.to_string()))?;

        self.ensure_dir()
            .map_err(|e| StoreError::Insertion(e.to_string()))?;

        let staging = self.staging_path();
        fs::write(&staging, json).map_err(|e| StoreError::Insertion(e.to_string()))?;

        if let Err(e) = fs::rename(&staging, &self.store_path) {
            let _ = fs::remove_file(&staging);
            return Err(StoreError::Insertion(e.to_string()));
        }

        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.store_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Deletion(e.to_string())),
        }
    }
}

impl FeedStore for FileFeedStore {
    fn delete_cached_feed(&self, completion: DeletionCompletion) {
        let result = self.remove();
        if let Err(ref e) = result {
            tracing::debug!(path = %self.store_path.display(), error = %e, "Cache file removal failed");
        }
        completion(result);
    }

    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
        completion: InsertionCompletion,
    ) {
        let count = feed.len();
        let result = self.write(feed, timestamp);
        match result {
            Ok(()) => tracing::debug!(path = %self.store_path.display(), items = count, "Wrote cache file"),
            Err(ref e) => tracing::debug!(path = %self.store_path.display(), error = %e, "Cache file write failed"),
        }
        completion(result);
    }

    fn retrieve(&self, completion: RetrievalCompletion) {
        completion(self.read());
    }
}
