//! Cache orchestration: save, load and validate the locally cached feed
//!
//! `LocalFeedLoader` is the only place with cache business rules. It talks to
//! a [`FeedStore`] (normally a [`SerialFeedStore`](super::SerialFeedStore)),
//! reads the time from an injected clock and applies [`FeedCachePolicy`].
//!
//! Store completions only hold a weak reference to the loader's state. Once
//! the loader is dropped, completions that fire later are no-ops and the
//! caller's completion is never invoked.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};

use super::policy::FeedCachePolicy;
use super::store::{CachedFeed, FeedStore, LocalFeedImage, StoreError};
use crate::feed::FeedImage;

/// Outcome of [`LocalFeedLoader::save`]
pub type SaveResult = Result<(), StoreError>;

/// Outcome of [`LocalFeedLoader::load`]; an empty feed is not an error
pub type LoadResult = Result<Vec<FeedImage>, StoreError>;

/// Source of the current time
pub type CurrentDate = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct Inner {
    store: Arc<dyn FeedStore>,
    current_date: CurrentDate,
}

/// Saves, loads and validates the locally cached feed
pub struct LocalFeedLoader {
    inner: Arc<Inner>,
}

impl LocalFeedLoader {
    /// Creates a loader over `store`, reading the time from `current_date`
    ///
    /// Creating a loader does not touch the store.
    pub fn new<F>(store: Arc<dyn FeedStore>, current_date: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                store,
                current_date: Box::new(current_date),
            }),
        }
    }

    /// Replaces the cached feed with `feed`, timestamped with the current date
    ///
    /// The existing cache is deleted first. If that fails the error is
    /// delivered and nothing is inserted; otherwise the insertion outcome is
    /// delivered.
    pub fn save<F>(&self, feed: Vec<FeedImage>, completion: F)
    where
        F: FnOnce(SaveResult) + Send + 'static,
    {
        let weak = Arc::downgrade(&self.inner);
        self.inner.store.delete_cached_feed(Box::new(move |result| {
            let Some(inner) = weak.upgrade() else {
                return;
            };

            match result {
                Ok(()) => Inner::cache(&inner, feed, completion),
                Err(error) => {
                    tracing::warn!(error = %error, "Failed to delete cached feed before saving");
                    completion(Err(error));
                }
            }
        }));
    }

    /// Loads the cached feed
    ///
    /// Delivers the cached images if they are still fresh, an empty feed if
    /// the cache is empty or expired, and the store error if retrieval fails.
    /// Loading never modifies the store; use [`validate_cache`](Self::validate_cache)
    /// to purge expired data.
    pub fn load<F>(&self, completion: F)
    where
        F: FnOnce(LoadResult) + Send + 'static,
    {
        let weak = Arc::downgrade(&self.inner);
        self.inner.store.retrieve(Box::new(move |result| {
            let Some(inner) = weak.upgrade() else {
                return;
            };

            match result {
                Err(error) => {
                    tracing::warn!(error = %error, "Failed to retrieve cached feed");
                    completion(Err(error));
                }
                Ok(CachedFeed::Found(snapshot))
                    if FeedCachePolicy::validate(snapshot.timestamp, inner.now()) =>
                {
                    tracing::debug!(items = snapshot.feed.len(), "Loaded cached feed");
                    completion(Ok(snapshot.feed.into_iter().map(FeedImage::from).collect()));
                }
                Ok(CachedFeed::Found(snapshot)) => {
                    tracing::debug!(cached_at = %snapshot.timestamp, "Cached feed has expired");
                    completion(Ok(Vec::new()));
                }
                Ok(CachedFeed::Empty) => completion(Ok(Vec::new())),
            }
        }));
    }

    /// Deletes the cache if it is unreadable or expired
    ///
    /// Best effort: store errors are logged, never reported.
    pub fn validate_cache(&self) {
        self.validate_cache_then(|| {});
    }

    /// Same as [`validate_cache`](Self::validate_cache), calling `on_finished`
    /// once the check and any resulting deletion are done
    ///
    /// `on_finished` carries no outcome and is not called if the loader is
    /// dropped before the retrieval or the resulting deletion completes.
    pub fn validate_cache_then<F>(&self, on_finished: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let weak = Arc::downgrade(&self.inner);
        self.inner.store.retrieve(Box::new(move |result| {
            let Some(inner) = weak.upgrade() else {
                return;
            };

            let reason = match result {
                Err(error) => {
                    tracing::warn!(error = %error, "Cached feed is unreadable");
                    "unreadable"
                }
                Ok(CachedFeed::Found(snapshot))
                    if !FeedCachePolicy::validate(snapshot.timestamp, inner.now()) =>
                {
                    "expired"
                }
                Ok(_) => {
                    on_finished();
                    return;
                }
            };

            let weak = Arc::downgrade(&inner);
            inner.store.delete_cached_feed(Box::new(move |result| {
                if weak.upgrade().is_none() {
                    return;
                }
                match result {
                    Ok(()) => tracing::info!(reason = reason, "Purged cached feed"),
                    Err(error) => {
                        tracing::warn!(reason = reason, error = %error, "Failed to purge cached feed")
                    }
                }
                on_finished();
            }));
        }));
    }
}

impl Inner {
    fn now(&self) -> DateTime<Utc> {
        (self.current_date)()
    }

    fn cache<F>(self: &Arc<Self>, feed: Vec<FeedImage>, completion: F)
    where
        F: FnOnce(SaveResult) + Send + 'static,
    {
        let weak: Weak<Inner> = Arc::downgrade(self);
        let local: Vec<LocalFeedImage> = feed.into_iter().map(LocalFeedImage::from).collect();
        let count = local.len();

        self.store.insert(
            local,
            self.now(),
            Box::new(move |result| {
                if weak.upgrade().is_none() {
                    return;
                }
                match &result {
                    Ok(()) => tracing::debug!(items = count, "Saved feed to cache"),
                    Err(error) => tracing::warn!(error = %error, "Failed to insert feed into cache"),
                }
                completion(result);
            }),
        );
    }
}
