//! Local feed cache
//!
//! This module provides the cache store contract, two interchangeable store
//! backends (a JSON file and a SQLite database), a serial execution gate that
//! keeps operations against one physical store strictly ordered, and the
//! `LocalFeedLoader` that saves, loads and validates the cached feed on top of
//! them.

mod file_store;
mod loader;
mod policy;
mod serial;
mod sqlite_store;
mod store;

pub use file_store::FileFeedStore;
pub use loader::{CurrentDate, LoadResult, LocalFeedLoader, SaveResult};
pub use policy::FeedCachePolicy;
pub use serial::SerialFeedStore;
pub use sqlite_store::SqliteFeedStore;
pub use store::{
    CacheSnapshot, CachedFeed, DeletionCompletion, FeedStore, InsertionCompletion,
    LocalFeedImage, RetrievalCompletion, RetrievalResult, StoreError,
};
