use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{errors::StorageResult, models::RetrievalUrl, value_objects::ImageKey};

/// Port for the object store that holds item images.
///
/// Keys are chosen by the caller; the store never invents them.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Store a blob under `key`, returning the key it was stored under
    async fn put_image(
        &self,
        key: &ImageKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ImageKey>;

    /// Resolve a time-limited retrieval URL for a stored blob
    async fn retrieval_url(&self, key: &ImageKey) -> StorageResult<RetrievalUrl>;
}
