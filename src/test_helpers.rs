//! Shared fixtures for unit tests

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use crate::cache::{
    DeletionCompletion, FeedStore, InsertionCompletion, LocalFeedImage, RetrievalCompletion,
    RetrievalResult, StoreError,
};
use crate::feed::FeedImage;

pub fn any_url() -> Url {
    Url::parse("https://any-url.com").unwrap()
}

pub fn any_error() -> StoreError {
    StoreError::Decoding("any error".to_string())
}

pub fn unique_image() -> FeedImage {
    FeedImage::new(
        Uuid::new_v4(),
        Some("any".to_string()),
        Some("any".to_string()),
        any_url(),
    )
}

/// Two unique images, as domain models and as store records
pub fn unique_image_feed() -> (Vec<FeedImage>, Vec<LocalFeedImage>) {
    let models = vec![unique_image(), unique_image()];
    let local = models.iter().cloned().map(LocalFeedImage::from).collect();
    (models, local)
}

/// A message the cache loader sent to its store
#[derive(Debug, Clone, PartialEq)]
pub enum ReceivedMessage {
    DeleteCachedFeed,
    Insert(Vec<LocalFeedImage>, DateTime<Utc>),
    Retrieve,
}

/// Records store messages and holds their completions until a test fires them
#[derive(Default)]
pub struct FeedStoreSpy {
    received_messages: Mutex<Vec<ReceivedMessage>>,
    deletion_completions: Mutex<Vec<Option<DeletionCompletion>>>,
    insertion_completions: Mutex<Vec<Option<InsertionCompletion>>>,
    retrieval_completions: Mutex<Vec<Option<RetrievalCompletion>>>,
}

impl FeedStoreSpy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received_messages(&self) -> Vec<ReceivedMessage> {
        self.received_messages.lock().unwrap().clone()
    }

    pub fn complete_deletion(&self, result: Result<(), StoreError>, index: usize) {
        let completion = take(&self.deletion_completions, index, "deletion");
        completion(result);
    }

    pub fn complete_insertion(&self, result: Result<(), StoreError>, index: usize) {
        let completion = take(&self.insertion_completions, index, "insertion");
        completion(result);
    }

    pub fn complete_retrieval(&self, result: RetrievalResult, index: usize) {
        let completion = take(&self.retrieval_completions, index, "retrieval");
        completion(result);
    }
}

/// Removes a pending completion, releasing the lock before it is called
fn take<T>(pending: &Mutex<Vec<Option<T>>>, index: usize, kind: &str) -> T {
    pending
        .lock()
        .unwrap()
        .get_mut(index)
        .and_then(Option::take)
        .unwrap_or_else(|| panic!("No pending {} completion at index {}", kind, index))
}

impl FeedStore for FeedStoreSpy {
    fn delete_cached_feed(&self, completion: DeletionCompletion) {
        self.deletion_completions.lock().unwrap().push(Some(completion));
        self.received_messages
            .lock()
            .unwrap()
            .push(ReceivedMessage::DeleteCachedFeed);
    }

    fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
        completion: InsertionCompletion,
    ) {
        self.insertion_completions.lock().unwrap().push(Some(completion));
        self.received_messages
            .lock()
            .unwrap()
            .push(ReceivedMessage::Insert(feed, timestamp));
    }

    fn retrieve(&self, completion: RetrievalCompletion) {
        self.retrieval_completions.lock().unwrap().push(Some(completion));
        self.received_messages
            .lock()
            .unwrap()
            .push(ReceivedMessage::Retrieve);
    }
}
