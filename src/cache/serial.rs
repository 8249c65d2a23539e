//! Serial execution gate for store backends
//!
//! Neither a single cache file nor a SQLite handle tolerates arbitrary
//! concurrent access, yet the cache loader can legitimately issue overlapping
//! operations (a `save` deleting and inserting while a `load` retrieves).
//! `SerialFeedStore` owns the backend on one worker thread that drains a FIFO
//! queue, so operations run one at a time in submission order.

use std::io;
use std::thread;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};

use super::store::{
    DeletionCompletion, FeedStore, InsertionCompletion, LocalFeedImage, RetrievalCompletion,
};

/// A store operation waiting for its turn
enum Operation {
    Retrieve(RetrievalCompletion),
    Insert {
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
        completion: InsertionCompletion,
    },
    Delete(DeletionCompletion),
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Retrieve(_) => "retrieve",
            Operation::Insert { .. } => "insert",
            Operation::Delete(_) => "delete",
        }
    }
}

/// Wraps a [`FeedStore`] so every operation against it runs strictly one at a time
///
/// An operation starts only after the previous one's completion has fired, so
/// completions are delivered in submission order. Nothing is skipped, merged
/// or reordered. Dropping the gate closes the queue; operations already queued
/// still run before the worker exits.
///
/// Completions run on the worker thread. They may submit further operations
/// to the same gate; those are queued behind anything already waiting.
pub struct SerialFeedStore {
    queue: mpsc::UnboundedSender<Operation>,
}

impl SerialFeedStore {
    /// Moves `store` onto a dedicated worker thread
    ///
    /// # Errors
    /// Returns an error if the worker thread cannot be spawned.
    pub fn new<S>(store: S) -> io::Result<Self>
    where
        S: FeedStore + 'static,
    {
        let (queue, pending) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("feed-store".to_string())
            .spawn(move || drain(store, pending))?;

        Ok(Self { queue })
    }

    fn submit(&self, operation: Operation) {
        if let Err(mpsc::error::SendError(operation)) = self.queue.send(operation) {
            // Only reachable if the worker panicked inside the backend.
            tracing::error!(operation = operation.name(), "Feed store worker is gone, dropping operation");
        }
    }
}

/// Runs queued operations until every sender is gone
fn drain<S: FeedStore>(store: S, mut pending: mpsc::UnboundedReceiver<Operation>) {
    tracing::debug!("Feed store worker started");

    while let Some(operation) = pending.blocking_recv() {
        let (done, finished) = oneshot::channel::<()>();
        let name = operation.name();
        tracing::trace!(operation = name, "Running store operation");

        match operation {
            Operation::Retrieve(completion) => store.retrieve(Box::new(move |result| {
                completion(result);
                let _ = done.send(());
            })),
            Operation::Insert {
                feed,
                timestamp,
                completion,
            } => store.insert(
                feed,
                timestamp,
                Box::new(move |result| {
                    completion(result);
                    let _ = done.send(());
                }),
            ),
            Operation::Delete(completion) => store.delete_cached_feed(Box::new(move |result| {
                completion(result);
                let _ = done.send(());
            })),
        }

        // A backend that drops a completion without calling it releases the
        // queue instead of wedging it.
        if finished.blocking_recv().is_err() {
            tracing::warn!(operation = name, "Store dropped a completion without calling it");
        }
    }

    tracing::debug!("Feed store worker stopped");
}

impl FeedStore for SerialFeedStore {
    fn delete_cached_feed(&self, completion: DeletionCompletion) {
        self.submit(Operation::Delete(completion));
    }

    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
        completion: InsertionCompletion,
    ) {
        self.submit(Operation::Insert {
            feed,
            timestamp,
            completion,
        });
    }

    fn retrieve(&self, completion: RetrievalCompletion) {
        self.submit(Operation::Retrieve(completion));
    }
}
