//! The contract every cache store backend satisfies
//!
//! A store holds at most one [`CacheSnapshot`]. All three operations are
//! completion based: the store calls the supplied closure exactly once with
//! the outcome, possibly on another thread. Implementations that are not safe
//! under concurrent access should be wrapped in a
//! [`SerialFeedStore`](super::SerialFeedStore).

use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::completion::Completion;

/// A feed image as persisted by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFeedImage {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

/// The single unit a store persists: an ordered feed plus when it was cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub feed: Vec<LocalFeedImage>,
    pub timestamp: DateTime<Utc>,
}

/// What a healthy store holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedFeed {
    /// Nothing has been cached, or the cache was deleted
    Empty,
    Found(CacheSnapshot),
}

/// Errors reported by store backends
///
/// The cache loader never inspects these beyond success/failure; the detail
/// string is for logs and for the CLI.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Stored data exists but could not be read back into a snapshot
    #[error("Failed to decode cached feed: {0}")]
    Decoding(String),

    /// The new snapshot could not be encoded or written
    #[error("Failed to insert cached feed: {0}")]
    Insertion(String),

    /// The existing snapshot could not be removed
    #[error("Failed to delete cached feed: {0}")]
    Deletion(String),
}

/// `Err` is a retrieval failure: the store is unreadable, not merely empty
pub type RetrievalResult = Result<CachedFeed, StoreError>;

pub type DeletionCompletion = Completion<Result<(), StoreError>>;
pub type InsertionCompletion = Completion<Result<(), StoreError>>;
pub type RetrievalCompletion = Completion<RetrievalResult>;

/// Persistence for exactly one cached feed snapshot
pub trait FeedStore: Send + Sync {
    /// Removes any cached snapshot. Deleting an empty store succeeds.
    fn delete_cached_feed(&self, completion: DeletionCompletion);

    /// Replaces any cached snapshot with `feed` cached at `timestamp`.
    ///
    /// On failure the previous snapshot (or emptiness) must be left intact.
    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
        completion: InsertionCompletion,
    );

    /// Reads the cached snapshot without side effects.
    fn retrieve(&self, completion: RetrievalCompletion);
}
