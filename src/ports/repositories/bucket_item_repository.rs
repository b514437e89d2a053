use async_trait::async_trait;

use crate::domain::{
    errors::RecordResult,
    models::{BucketItem, BucketItemUpdate, NewBucketItem},
    value_objects::{ItemId, Username},
};

/// Record store for bucket items.
///
/// Every call is scoped to `owner`; keeping one owner's items out of another
/// owner's reach is the store's job, not the caller's.
#[async_trait]
pub trait BucketItemRepository: Send + Sync + 'static {
    /// All items belonging to `owner`, in no particular order
    async fn list_items(&self, owner: &Username) -> RecordResult<Vec<BucketItem>>;

    /// Persist a new item; the store assigns `id` and `created_at`
    async fn create_item(&self, owner: &Username, item: NewBucketItem) -> RecordResult<BucketItem>;

    /// Replace title and image key of an existing item
    async fn update_item(
        &self,
        owner: &Username,
        update: BucketItemUpdate,
    ) -> RecordResult<BucketItem>;

    /// Remove an item
    async fn delete_item(&self, owner: &Username, id: &ItemId) -> RecordResult<()>;
}
