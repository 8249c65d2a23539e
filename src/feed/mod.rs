//! Feed domain model
//!
//! `FeedImage` is the item type handed to callers by both the local cache and
//! the remote loader. Stores never see it directly; they work with
//! [`LocalFeedImage`](crate::cache::LocalFeedImage).

use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::cache::LocalFeedImage;

/// A single image in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedImage {
    /// Unique identifier of the image
    pub id: Uuid,
    /// Optional caption
    pub description: Option<String>,
    /// Optional place name
    pub location: Option<String>,
    /// Where the image itself lives
    pub url: Url,
}

impl FeedImage {
    pub fn new(
        id: Uuid,
        description: Option<String>,
        location: Option<String>,
        url: Url,
    ) -> Self {
        Self {
            id,
            description,
            location,
            url,
        }
    }
}

impl From<FeedImage> for LocalFeedImage {
    fn from(image: FeedImage) -> Self {
        LocalFeedImage {
            id: image.id,
            description: image.description,
            location: image.location,
            url: image.url,
        }
    }
}

impl From<LocalFeedImage> for FeedImage {
    fn from(local: LocalFeedImage) -> Self {
        FeedImage {
            id: local.id,
            description: local.description,
            location: local.location,
            url: local.url,
        }
    }
}
