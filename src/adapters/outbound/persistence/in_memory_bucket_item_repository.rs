use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{RecordResult, RecordStoreError},
        models::{BucketItem, BucketItemUpdate, NewBucketItem},
        value_objects::{ItemId, Username},
    },
    ports::{
        clock::{Clock, SystemClock},
        repositories::BucketItemRepository,
    },
};

/// In-memory implementation of BucketItemRepository for testing and development
#[derive(Clone)]
pub struct InMemoryBucketItemRepository {
    data: Arc<RwLock<RepositoryData>>,
    clock: Arc<dyn Clock>,
}

#[derive(Default)]
struct RepositoryData {
    // Map of owner -> item id -> item
    items: HashMap<Username, HashMap<ItemId, BucketItem>>,
}

impl InMemoryBucketItemRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Stamp `created_at` from the given clock instead of wall-clock time
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            data: Arc::new(RwLock::new(RepositoryData::default())),
            clock,
        }
    }

    /// Insert a record verbatim, bypassing id and timestamp assignment
    pub async fn insert_raw(&self, owner: &Username, item: BucketItem) {
        let mut data = self.data.write().await;
        data.items
            .entry(owner.clone())
            .or_default()
            .insert(item.id.clone(), item);
    }

    /// Number of items stored for `owner`
    pub async fn count(&self, owner: &Username) -> usize {
        let data = self.data.read().await;
        data.items.get(owner).map_or(0, HashMap::len)
    }
}

impl Default for InMemoryBucketItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BucketItemRepository for InMemoryBucketItemRepository {
    async fn list_items(&self, owner: &Username) -> RecordResult<Vec<BucketItem>> {
        let data = self.data.read().await;

        Ok(data
            .items
            .get(owner)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_item(&self, owner: &Username, item: NewBucketItem) -> RecordResult<BucketItem> {
        let record = BucketItem {
            id: ItemId::generate(),
            title: item.title,
            image_key: item.image_key,
            created_at: self.clock.now(),
        };

        let mut data = self.data.write().await;
        data.items
            .entry(owner.clone())
            .or_default()
            .insert(record.id.clone(), record.clone());

        Ok(record)
    }

    async fn update_item(
        &self,
        owner: &Username,
        update: BucketItemUpdate,
    ) -> RecordResult<BucketItem> {
        let mut data = self.data.write().await;

        let stored = data
            .items
            .get_mut(owner)
            .and_then(|items| items.get_mut(&update.id))
            .ok_or_else(|| RecordStoreError::ItemNotFound {
                id: update.id.clone(),
                owner: owner.clone(),
            })?;

        stored.title = update.title;
        stored.image_key = update.image_key;

        Ok(stored.clone())
    }

    async fn delete_item(&self, owner: &Username, id: &ItemId) -> RecordResult<()> {
        let mut data = self.data.write().await;

        data.items
            .get_mut(owner)
            .and_then(|items| items.remove(id))
            .map(|_| ())
            .ok_or_else(|| RecordStoreError::ItemNotFound {
                id: id.clone(),
                owner: owner.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ImageKey, Title};
    use crate::ports::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn owner(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    fn new_item(title: &str) -> NewBucketItem {
        NewBucketItem {
            title: Title::new(title).unwrap(),
            image_key: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 2, 2, 9, 0, 0).unwrap();
        let repo = InMemoryBucketItemRepository::with_clock(Arc::new(FixedClock::new(at)));
        let alice = owner("alice");

        let created = repo.create_item(&alice, new_item("Visit Japan")).await.unwrap();

        assert_eq!(created.title.as_str(), "Visit Japan");
        assert_eq!(created.created_at, at);
        assert_eq!(repo.list_items(&alice).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_items_are_scoped_to_owner() {
        let repo = InMemoryBucketItemRepository::new();
        let alice = owner("alice");
        let bob = owner("bob");

        let created = repo.create_item(&alice, new_item("Climb")).await.unwrap();

        assert!(repo.list_items(&bob).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete_item(&bob, &created.id).await,
            Err(RecordStoreError::ItemNotFound { .. })
        ));
        assert_eq!(repo.count(&alice).await, 1);
    }

    #[tokio::test]
    async fn test_update_replaces_title_and_key() {
        let repo = InMemoryBucketItemRepository::new();
        let alice = owner("alice");
        let created = repo.create_item(&alice, new_item("Run")).await.unwrap();
        let key = ImageKey::new("bucket-images/alice/1-shoes.png".to_string()).unwrap();

        let updated = repo
            .update_item(
                &alice,
                BucketItemUpdate {
                    id: created.id.clone(),
                    title: Title::new("Run a marathon").unwrap(),
                    image_key: Some(key.clone()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.title.as_str(), "Run a marathon");
        assert_eq!(updated.image_key, Some(key));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_item() {
        let repo = InMemoryBucketItemRepository::new();
        let alice = owner("alice");
        let missing = ItemId::generate();

        let update = BucketItemUpdate {
            id: missing.clone(),
            title: Title::new("x").unwrap(),
            image_key: None,
        };
        assert!(repo.update_item(&alice, update).await.is_err());
        assert!(repo.delete_item(&alice, &missing).await.is_err());
    }
}
