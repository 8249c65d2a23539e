//! Runs one CLI command against the configured feed cache

use std::fs;
use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::api::{FeedItemsMapper, RemoteFeedError, RemoteFeedLoader, ReqwestHttpClient};
use crate::cache::{
    FeedStore, FileFeedStore, LoadResult, LocalFeedLoader, SaveResult, SerialFeedStore,
    SqliteFeedStore, StoreError,
};
use crate::cli::{Backend, Command};
use crate::completion::completed;
use crate::config::StoreConfig;
use crate::feed::FeedImage;

/// Everything that can make a command fail
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteFeedError),

    #[error("Failed to open cache database: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode feed: {0}")]
    Json(#[from] serde_json::Error),

    /// The cache worker went away before answering
    #[error("Cache operation was abandoned before completing")]
    Abandoned,
}

/// Opens the configured backend behind a serial execution gate
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn FeedStore>, AppError> {
    let store: Arc<dyn FeedStore> = match config.backend {
        Backend::File => Arc::new(SerialFeedStore::new(FileFeedStore::new(&config.path))?),
        Backend::Sqlite => {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            Arc::new(SerialFeedStore::new(SqliteFeedStore::open(&config.path)?)?)
        }
    };

    tracing::debug!(backend = ?config.backend, path = %config.path.display(), "Opened feed store");
    Ok(store)
}

/// Executes `command`, writing any user-facing output to `out`
pub async fn run(
    command: Command,
    config: &StoreConfig,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let store = open_store(config)?;
    let loader = LocalFeedLoader::new(Arc::clone(&store), Utc::now);

    match command {
        Command::Load => {
            let feed = completed::<LoadResult, _>(|completion| loader.load(completion))
                .await
                .ok_or(AppError::Abandoned)??;
            writeln!(out, "{}", serde_json::to_string_pretty(&feed)?)?;
        }
        Command::Validate => {
            completed::<(), _>(|completion| loader.validate_cache_then(move || completion(())))
                .await
                .ok_or(AppError::Abandoned)?;
            writeln!(out, "Cache validated")?;
        }
        Command::Save { file } => {
            let body = fs::read(&file)?;
            let feed = FeedItemsMapper::map(&body, 200)?;
            save(&loader, feed, out).await?;
        }
        Command::Fetch { url } => {
            let remote = RemoteFeedLoader::new(url, ReqwestHttpClient::new());
            let feed = remote.load().await?;
            save(&loader, feed, out).await?;
        }
        Command::Clear => {
            completed(|completion| store.delete_cached_feed(completion))
                .await
                .ok_or(AppError::Abandoned)??;
            writeln!(out, "Cache cleared")?;
        }
    }

    Ok(())
}

async fn save(
    loader: &LocalFeedLoader,
    feed: Vec<FeedImage>,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let count = feed.len();
    completed::<SaveResult, _>(|completion| loader.save(feed, completion))
        .await
        .ok_or(AppError::Abandoned)??;
    writeln!(out, "Cached {} items", count)?;
    Ok(())
}
