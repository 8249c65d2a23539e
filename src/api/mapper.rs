//! Maps a remote feed payload into feed images

use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::RemoteFeedError;
use crate::feed::FeedImage;

const OK_200: u16 = 200;

#[derive(Debug, Deserialize)]
struct Root {
    items: Vec<RemoteFeedItem>,
}

/// A feed item as the remote API describes it
#[derive(Debug, Deserialize)]
struct RemoteFeedItem {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    image: Url,
}

impl From<RemoteFeedItem> for FeedImage {
    fn from(item: RemoteFeedItem) -> Self {
        FeedImage::new(item.id, item.description, item.location, item.image)
    }
}

/// Stateless mapper from an HTTP status and body to feed images
pub struct FeedItemsMapper;

impl FeedItemsMapper {
    /// Decodes `{"items": [...]}` from a 200 response
    ///
    /// # Returns
    /// * `Ok(Vec<FeedImage>)` in payload order
    /// * `Err(RemoteFeedError::InvalidData)` for any other status or a malformed body
    pub fn map(body: &[u8], status: u16) -> Result<Vec<FeedImage>, RemoteFeedError> {
        if status != OK_200 {
            return Err(RemoteFeedError::InvalidData);
        }

        let root: Root = serde_json::from_slice(body).map_err(|_| RemoteFeedError::InvalidData)?;
        Ok(root.items.into_iter().map(FeedImage::from).collect())
    }
}
