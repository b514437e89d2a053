#![allow(dead_code)]

use async_trait::async_trait;
use bucket_list::{
    ApacheObjectStoreAdapter, BucketItem, BucketItemRepository, FixedClock, ImageKey, ImageStore,
    InMemoryBucketItemRepository, ItemId, ItemWorkflowBuilder, ItemWorkflowController,
    RecordStoreError, RetrievalUrl, StaticIdentityProvider, StorageError, Title, Username,
    WorkflowConfig,
    domain::{
        errors::{RecordResult, StorageResult},
        models::{BucketItemUpdate, NewBucketItem},
    },
};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use object_store::memory::InMemory;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub const BASE_URL: &str = "memory://bucket-images";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

pub fn username(name: &str) -> Username {
    Username::new(name.to_string()).unwrap()
}

pub fn record(title: &str, image_key: Option<&str>, created_at: DateTime<Utc>) -> BucketItem {
    BucketItem {
        id: ItemId::generate(),
        title: Title::new(title).unwrap(),
        image_key: image_key.map(|k| ImageKey::new(k.to_string()).unwrap()),
        created_at,
    }
}

fn injected(operation: &str) -> RecordStoreError {
    RecordStoreError::Unavailable {
        message: format!("injected {} failure", operation),
        detail: None,
    }
}

/// Record store wrapper that counts calls, can be told to fail, and can
/// hold each call open for a while.
pub struct CountingRepository {
    inner: Arc<dyn BucketItemRepository>,
    pub lists: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_lists: AtomicBool,
    pub fail_creates: AtomicBool,
    pub fail_updates: AtomicBool,
    pub fail_deletes: AtomicBool,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingRepository {
    pub fn new(inner: Arc<dyn BucketItemRepository>) -> Self {
        Self {
            inner,
            lists: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            fail_lists: AtomicBool::new(false),
            fail_creates: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn enter(&self, counter: &AtomicUsize, fail: &AtomicBool, operation: &str) -> RecordResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if fail.load(Ordering::SeqCst) {
            return Err(injected(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl BucketItemRepository for CountingRepository {
    async fn list_items(&self, owner: &Username) -> RecordResult<Vec<BucketItem>> {
        self.enter(&self.lists, &self.fail_lists, "list").await?;
        self.inner.list_items(owner).await
    }

    async fn create_item(&self, owner: &Username, item: NewBucketItem) -> RecordResult<BucketItem> {
        self.enter(&self.creates, &self.fail_creates, "create").await?;
        self.inner.create_item(owner, item).await
    }

    async fn update_item(
        &self,
        owner: &Username,
        update: BucketItemUpdate,
    ) -> RecordResult<BucketItem> {
        self.enter(&self.updates, &self.fail_updates, "update").await?;
        self.inner.update_item(owner, update).await
    }

    async fn delete_item(&self, owner: &Username, id: &ItemId) -> RecordResult<()> {
        self.enter(&self.deletes, &self.fail_deletes, "delete").await?;
        self.inner.delete_item(owner, id).await
    }
}

/// Record store that lists a fixed set of records in the order given
pub struct OrderedRepository {
    records: Vec<BucketItem>,
}

impl OrderedRepository {
    pub fn new(records: Vec<BucketItem>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl BucketItemRepository for OrderedRepository {
    async fn list_items(&self, _owner: &Username) -> RecordResult<Vec<BucketItem>> {
        Ok(self.records.clone())
    }

    async fn create_item(&self, _owner: &Username, _item: NewBucketItem) -> RecordResult<BucketItem> {
        Err(RecordStoreError::Rejected {
            message: "read-only".to_string(),
        })
    }

    async fn update_item(
        &self,
        _owner: &Username,
        _update: BucketItemUpdate,
    ) -> RecordResult<BucketItem> {
        Err(RecordStoreError::Rejected {
            message: "read-only".to_string(),
        })
    }

    async fn delete_item(&self, _owner: &Username, _id: &ItemId) -> RecordResult<()> {
        Err(RecordStoreError::Rejected {
            message: "read-only".to_string(),
        })
    }
}

/// Image store wrapper that counts uploads, can be told to fail, and can
/// hold URL resolution open for a while.
pub struct FlakyImageStore {
    inner: ApacheObjectStoreAdapter,
    pub puts: AtomicUsize,
    pub fail_puts: AtomicBool,
    pub fail_urls: AtomicBool,
    resolving: AtomicUsize,
    pub max_resolving: AtomicUsize,
    url_delay: Option<Duration>,
}

impl FlakyImageStore {
    pub fn new(inner: ApacheObjectStoreAdapter) -> Self {
        Self {
            inner,
            puts: AtomicUsize::new(0),
            fail_puts: AtomicBool::new(false),
            fail_urls: AtomicBool::new(false),
            resolving: AtomicUsize::new(0),
            max_resolving: AtomicUsize::new(0),
            url_delay: None,
        }
    }

    pub fn with_url_delay(mut self, delay: Duration) -> Self {
        self.url_delay = Some(delay);
        self
    }
}

#[async_trait]
impl ImageStore for FlakyImageStore {
    async fn put_image(
        &self,
        key: &ImageKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ImageKey> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::InfrastructureError {
                message: "injected upload failure".to_string(),
                source: None,
            });
        }
        self.inner.put_image(key, data, content_type).await
    }

    async fn retrieval_url(&self, key: &ImageKey) -> StorageResult<RetrievalUrl> {
        let now = self.resolving.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_resolving.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.url_delay {
            tokio::time::sleep(delay).await;
        }
        self.resolving.fetch_sub(1, Ordering::SeqCst);

        if self.fail_urls.load(Ordering::SeqCst) {
            return Err(StorageError::AccessDenied {
                key: key.clone(),
                operation: "resolve URL".to_string(),
            });
        }
        self.inner.retrieval_url(key).await
    }
}

/// A controller wired to in-memory collaborators that tests can poke at
pub struct Harness {
    pub workflow: ItemWorkflowController,
    pub records: Arc<InMemoryBucketItemRepository>,
    pub repository: Arc<CountingRepository>,
    pub blobs: Arc<InMemory>,
    pub images: Arc<FlakyImageStore>,
    pub clock: Arc<FixedClock>,
    pub owner: Username,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(WorkflowConfig::default(), None)
    }

    /// Harness whose image URL resolution takes `delay`
    pub fn slow_urls(delay: Duration) -> Self {
        Self::build_with(WorkflowConfig::default(), None, Some(delay))
    }

    pub fn serialized(delay: Duration) -> Self {
        Self::build(
            WorkflowConfig {
                serialize_actions: true,
                ..WorkflowConfig::default()
            },
            Some(delay),
        )
    }

    pub fn overlapping(delay: Duration) -> Self {
        Self::build(WorkflowConfig::default(), Some(delay))
    }

    fn build(config: WorkflowConfig, delay: Option<Duration>) -> Self {
        Self::build_with(config, delay, None)
    }

    fn build_with(
        config: WorkflowConfig,
        delay: Option<Duration>,
        url_delay: Option<Duration>,
    ) -> Self {
        let owner = username("alice");
        let clock = Arc::new(FixedClock::new(start_time()));
        let records = Arc::new(InMemoryBucketItemRepository::with_clock(clock.clone()));

        let mut repository = CountingRepository::new(records.clone());
        if let Some(delay) = delay {
            repository = repository.with_delay(delay);
        }
        let repository = Arc::new(repository);

        let blobs = Arc::new(InMemory::new());
        let mut images = FlakyImageStore::new(ApacheObjectStoreAdapter::new(blobs.clone(), BASE_URL));
        if let Some(delay) = url_delay {
            images = images.with_url_delay(delay);
        }
        let images = Arc::new(images);

        let workflow = ItemWorkflowBuilder::new()
            .repository(repository.clone())
            .images(images.clone())
            .identity(Arc::new(StaticIdentityProvider::new(owner.clone())))
            .clock(clock.clone())
            .config(config)
            .build()
            .unwrap();

        Self {
            workflow,
            records,
            repository,
            blobs,
            images,
            clock,
            owner,
        }
    }

    pub fn creates(&self) -> usize {
        self.repository.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.repository.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.repository.deletes.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.images.puts.load(Ordering::SeqCst)
    }

    /// Move the clock forward so the next record sorts after the previous one
    pub fn tick(&self) {
        self.clock.advance(chrono::Duration::seconds(1));
    }
}
