//! Store contract assertions shared by every backend's test suite
//!
//! Each `assert_that_*` helper checks one behavior of the `FeedStore`
//! contract against the given store.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;

use feedcache::cache::{CachedFeed, FeedStore, LocalFeedImage, StoreError};
use feedcache::completion::completed;

pub fn unique_local_image() -> LocalFeedImage {
    LocalFeedImage {
        id: Uuid::new_v4(),
        description: Some("any".to_string()),
        location: Some("any".to_string()),
        url: Url::parse("https://any-url.com").unwrap(),
    }
}

pub fn unique_local_feed() -> Vec<LocalFeedImage> {
    vec![unique_local_image(), unique_local_image()]
}

/// Expected outcome of a retrieval; failures compare by kind only
#[derive(Debug)]
pub enum Expected {
    Empty,
    Found(Vec<LocalFeedImage>, DateTime<Utc>),
    Failure,
}

pub async fn retrieve(sut: &dyn FeedStore) -> Result<CachedFeed, StoreError> {
    completed(|completion| sut.retrieve(completion))
        .await
        .expect("Retrieval completion was never called")
}

pub async fn insert(
    sut: &dyn FeedStore,
    feed: Vec<LocalFeedImage>,
    timestamp: DateTime<Utc>,
) -> Result<(), StoreError> {
    completed(|completion| sut.insert(feed, timestamp, completion))
        .await
        .expect("Insertion completion was never called")
}

pub async fn delete_cache(sut: &dyn FeedStore) -> Result<(), StoreError> {
    completed(|completion| sut.delete_cached_feed(completion))
        .await
        .expect("Deletion completion was never called")
}

pub async fn expect_retrieve(sut: &dyn FeedStore, expected: Expected) {
    let retrieved = retrieve(sut).await;
    match (&expected, &retrieved) {
        (Expected::Empty, Ok(CachedFeed::Empty)) | (Expected::Failure, Err(_)) => {}
        (Expected::Found(feed, timestamp), Ok(CachedFeed::Found(snapshot))) => {
            assert_eq!(&snapshot.feed, feed);
            assert_eq!(&snapshot.timestamp, timestamp);
        }
        _ => panic!("Expected to retrieve {:?}, got {:?} instead", expected, retrieved),
    }
}

pub async fn expect_retrieve_twice(sut: &dyn FeedStore, expected: impl Fn() -> Expected) {
    expect_retrieve(sut, expected()).await;
    expect_retrieve(sut, expected()).await;
}

pub async fn assert_that_retrieve_delivers_empty_on_empty_cache(sut: &dyn FeedStore) {
    expect_retrieve(sut, Expected::Empty).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_empty_cache(sut: &dyn FeedStore) {
    expect_retrieve_twice(sut, || Expected::Empty).await;
}

pub async fn assert_that_retrieve_delivers_found_values_on_non_empty_cache(sut: &dyn FeedStore) {
    let feed = unique_local_feed();
    let timestamp = Utc::now();

    insert(sut, feed.clone(), timestamp).await.unwrap();

    expect_retrieve(sut, Expected::Found(feed, timestamp)).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_non_empty_cache(sut: &dyn FeedStore) {
    let feed = unique_local_feed();
    let timestamp = Utc::now();

    insert(sut, feed.clone(), timestamp).await.unwrap();

    expect_retrieve_twice(sut, || Expected::Found(feed.clone(), timestamp)).await;
}

pub async fn assert_that_retrieve_delivers_failure_on_retrieval_error(sut: &dyn FeedStore) {
    expect_retrieve(sut, Expected::Failure).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_failure(sut: &dyn FeedStore) {
    expect_retrieve_twice(sut, || Expected::Failure).await;
}

pub async fn assert_that_insert_delivers_no_error_on_empty_cache(sut: &dyn FeedStore) {
    let result = insert(sut, unique_local_feed(), Utc::now()).await;

    assert!(result.is_ok(), "Expected to insert cache successfully, got {:?}", result);
}

pub async fn assert_that_insert_delivers_no_error_on_non_empty_cache(sut: &dyn FeedStore) {
    insert(sut, unique_local_feed(), Utc::now()).await.unwrap();

    let result = insert(sut, unique_local_feed(), Utc::now()).await;

    assert!(result.is_ok(), "Expected to override cache successfully, got {:?}", result);
}

pub async fn assert_that_insert_overrides_previously_inserted_cache_values(sut: &dyn FeedStore) {
    insert(sut, unique_local_feed(), Utc::now()).await.unwrap();

    let latest_feed = unique_local_feed();
    let latest_timestamp = Utc::now();
    insert(sut, latest_feed.clone(), latest_timestamp).await.unwrap();

    expect_retrieve(sut, Expected::Found(latest_feed, latest_timestamp)).await;
}

pub async fn assert_that_insert_delivers_error_on_insertion_error(sut: &dyn FeedStore) {
    let result = insert(sut, unique_local_feed(), Utc::now()).await;

    assert!(
        matches!(result, Err(StoreError::Insertion(_))),
        "Expected cache insertion to fail, got {:?}",
        result
    );
}

pub async fn assert_that_delete_delivers_no_error_on_empty_cache(sut: &dyn FeedStore) {
    let result = delete_cache(sut).await;

    assert!(result.is_ok(), "Expected empty cache deletion to succeed, got {:?}", result);
}

pub async fn assert_that_delete_has_no_side_effects_on_empty_cache(sut: &dyn FeedStore) {
    delete_cache(sut).await.unwrap();

    expect_retrieve(sut, Expected::Empty).await;
}

pub async fn assert_that_delete_delivers_no_error_on_non_empty_cache(sut: &dyn FeedStore) {
    insert(sut, unique_local_feed(), Utc::now()).await.unwrap();

    let result = delete_cache(sut).await;

    assert!(result.is_ok(), "Expected non empty cache deletion to succeed, got {:?}", result);
}

pub async fn assert_that_delete_empties_previously_inserted_cache(sut: &dyn FeedStore) {
    insert(sut, unique_local_feed(), Utc::now()).await.unwrap();

    delete_cache(sut).await.unwrap();

    expect_retrieve(sut, Expected::Empty).await;
}

pub async fn assert_that_side_effects_run_serially(sut: &dyn FeedStore) {
    let completed_in_order = Arc::new(Mutex::new(Vec::new()));

    let (tx1, rx1) = oneshot::channel();
    let order = Arc::clone(&completed_in_order);
    sut.insert(
        unique_local_feed(),
        Utc::now(),
        Box::new(move |_| {
            order.lock().unwrap().push("operation 1");
            let _ = tx1.send(());
        }),
    );

    let (tx2, rx2) = oneshot::channel();
    let order = Arc::clone(&completed_in_order);
    sut.delete_cached_feed(Box::new(move |_| {
        order.lock().unwrap().push("operation 2");
        let _ = tx2.send(());
    }));

    let (tx3, rx3) = oneshot::channel();
    let order = Arc::clone(&completed_in_order);
    sut.insert(
        unique_local_feed(),
        Utc::now(),
        Box::new(move |_| {
            order.lock().unwrap().push("operation 3");
            let _ = tx3.send(());
        }),
    );

    rx1.await.unwrap();
    rx2.await.unwrap();
    rx3.await.unwrap();

    assert_eq!(
        *completed_in_order.lock().unwrap(),
        vec!["operation 1", "operation 2", "operation 3"],
        "Expected side effects to run serially but they ran in the wrong order"
    );
}
