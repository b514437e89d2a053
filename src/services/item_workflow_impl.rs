use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, error, info, warn};

use crate::{
    domain::{
        errors::{IdentityError, WorkflowError, WorkflowResult},
        models::{
            BucketItem, BucketItemUpdate, Draft, EditSession, ImageUpload, NewBucketItem,
            RetrievalUrl, ViewItem, ViewState, merge_display_fields, sort_by_created_at,
        },
        value_objects::{DEFAULT_IMAGE_NAMESPACE, ImageKey, ItemId, Title},
    },
    ports::{
        clock::{Clock, SystemClock},
        identity::{Caller, IdentityProvider},
        repositories::BucketItemRepository,
        services::ItemWorkflow,
        storage::ImageStore,
    },
};

/// Tunables for the workflow controller
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// First path segment of every uploaded image key
    pub image_namespace: String,
    /// Run mutating actions one at a time instead of letting them overlap.
    ///
    /// Off by default: overlapping actions race and the last one to finish
    /// wins.
    pub serialize_actions: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            image_namespace: DEFAULT_IMAGE_NAMESPACE.to_string(),
            serialize_actions: false,
        }
    }
}

/// Drives every list-mutating user action and owns the local view state.
///
/// Remote failures abort the operation, are logged, and leave the local state
/// exactly as it was before the call. Nothing is retried and nothing already
/// written remotely is rolled back, so a failed create/update after a
/// successful upload leaves the uploaded blob behind, as does a delete.
#[derive(Clone)]
pub struct ItemWorkflowController {
    repository: Arc<dyn BucketItemRepository>,
    images: Arc<dyn ImageStore>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    config: WorkflowConfig,
    state: Arc<RwLock<ViewState>>,
    action_gate: Arc<Mutex<()>>,
}

impl ItemWorkflowController {
    /// Create a new controller with an empty local list
    pub fn new(
        repository: Arc<dyn BucketItemRepository>,
        images: Arc<dyn ImageStore>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            repository,
            images,
            identity,
            clock,
            config,
            state: Arc::new(RwLock::new(ViewState::default())),
            action_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Greeting name of the signed-in caller
    pub fn display_name(&self) -> Result<String, IdentityError> {
        self.identity.current_caller().map(|caller| caller.display_name())
    }

    /// Sign out and drop everything shown to the previous caller
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        self.identity.sign_out().await?;
        *self.state.write().await = ViewState::default();
        info!("Signed out");
        Ok(())
    }

    /// Full copy of the view state
    pub async fn snapshot(&self) -> ViewState {
        self.state.read().await.clone()
    }

    pub async fn draft(&self) -> Draft {
        self.state.read().await.draft.clone()
    }

    pub async fn set_draft_title(&self, title: impl Into<String>) {
        self.state.write().await.draft.title = title.into();
    }

    pub async fn select_draft_image(&self, image: Option<ImageUpload>) {
        self.state.write().await.draft.image = image;
    }

    /// Create an item from the compose form, clearing the form on success
    pub async fn submit_draft(&self) -> WorkflowResult<Option<ViewItem>> {
        let draft = self.draft().await;
        let created = self.create_item(&draft.title, draft.image).await?;
        if created.is_some() {
            self.state.write().await.draft.clear();
        }
        Ok(created)
    }

    pub async fn editing(&self) -> Option<EditSession> {
        self.state.read().await.editing.clone()
    }

    /// Change the title of the edit in progress; false when nothing is being edited
    pub async fn set_edit_title(&self, title: impl Into<String>) -> bool {
        match self.state.write().await.editing.as_mut() {
            Some(session) => {
                session.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Pick a replacement image for the edit in progress
    pub async fn select_edit_image(&self, image: Option<ImageUpload>) -> bool {
        match self.state.write().await.editing.as_mut() {
            Some(session) => {
                session.replacement_image = image;
                true
            }
            None => false,
        }
    }

    /// Save the edit in progress
    pub async fn save_edit(&self) -> WorkflowResult<Option<ViewItem>> {
        let session = self
            .editing()
            .await
            .ok_or(WorkflowError::NoEditInProgress)?;
        self.update_item(&session.id, &session.title, session.replacement_image)
            .await
    }

    async fn gate(&self) -> Option<MutexGuard<'_, ()>> {
        if self.config.serialize_actions {
            Some(self.action_gate.lock().await)
        } else {
            None
        }
    }

    async fn load_items(&self) -> WorkflowResult<Vec<ViewItem>> {
        let caller = self.identity.current_caller()?;
        let records = self.repository.list_items(&caller.username).await?;

        let mut items = join_all(records.into_iter().map(|record| self.resolve_display(record))).await;
        sort_by_created_at(&mut items);
        Ok(items)
    }

    /// Attach a fresh retrieval URL; a failed resolution only costs this item its image
    async fn resolve_display(&self, record: BucketItem) -> ViewItem {
        let image_url = match &record.image_key {
            Some(key) => match self.images.retrieval_url(key).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(item_id = %record.id, image_key = %key, error = %e, "Could not resolve image URL, showing item without image");
                    None
                }
            },
            None => None,
        };
        merge_display_fields(record, image_url)
    }

    /// Upload first, then resolve a URL for immediate display
    async fn upload_image(
        &self,
        caller: &Caller,
        image: ImageUpload,
    ) -> WorkflowResult<(ImageKey, RetrievalUrl)> {
        let key = ImageKey::for_upload(
            &self.config.image_namespace,
            &caller.username,
            self.clock.now(),
            &image.file_name,
        )?;

        debug!(image_key = %key, bytes = image.len(), "Uploading image");
        let stored = self
            .images
            .put_image(&key, image.data, image.content_type.as_deref())
            .await
            .map_err(WorkflowError::Upload)?;

        let url = self
            .images
            .retrieval_url(&stored)
            .await
            .map_err(WorkflowError::UrlResolution)?;

        Ok((stored, url))
    }

    async fn create_inner(
        &self,
        title: Title,
        image: Option<ImageUpload>,
    ) -> WorkflowResult<ViewItem> {
        let caller = self.identity.current_caller()?;

        let (image_key, image_url) = match image {
            Some(image) => {
                let (key, url) = self.upload_image(&caller, image).await?;
                (Some(key), Some(url))
            }
            None => (None, None),
        };

        let record = self
            .repository
            .create_item(&caller.username, NewBucketItem { title, image_key })
            .await?;
        let item = merge_display_fields(record, image_url);

        let mut state = self.state.write().await;
        // Normally an append; stays sorted even if the store's clock went backwards.
        let position = state
            .items
            .partition_point(|existing| existing.created_at <= item.created_at);
        state.items.insert(position, item.clone());

        Ok(item)
    }

    async fn update_inner(
        &self,
        id: &ItemId,
        title: Title,
        replacement_image: Option<ImageUpload>,
    ) -> WorkflowResult<ViewItem> {
        let current = {
            let state = self.state.read().await;
            if !state.is_editing(id) {
                return Err(WorkflowError::NotEditing { id: id.clone() });
            }
            state
                .find(id)
                .cloned()
                .ok_or_else(|| WorkflowError::UnknownItem { id: id.clone() })?
        };
        let caller = self.identity.current_caller()?;

        let (image_key, image_url) = match replacement_image {
            Some(image) => {
                let (key, url) = self.upload_image(&caller, image).await?;
                (Some(key), Some(url))
            }
            None => (current.image_key, current.image_url),
        };

        let record = self
            .repository
            .update_item(
                &caller.username,
                BucketItemUpdate {
                    id: id.clone(),
                    title,
                    image_key,
                },
            )
            .await?;
        let item = merge_display_fields(record, image_url);

        let mut state = self.state.write().await;
        if let Some(slot) = state.items.iter_mut().find(|existing| existing.id == item.id) {
            *slot = item.clone();
        }
        state.editing = None;

        Ok(item)
    }

    async fn delete_inner(&self, id: &ItemId) -> WorkflowResult<bool> {
        let caller = self.identity.current_caller()?;
        self.repository.delete_item(&caller.username, id).await?;

        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|item| &item.id != id);
        if state.is_editing(id) {
            state.editing = None;
        }

        Ok(state.items.len() != before)
    }
}

fn log_failure<T>(operation: &'static str, result: WorkflowResult<T>) -> WorkflowResult<T> {
    if let Err(e) = &result {
        error!(operation, error = %e, "Bucket item operation failed");
    }
    result
}

#[async_trait]
impl ItemWorkflow for ItemWorkflowController {
    async fn refresh(&self) -> WorkflowResult<Vec<ViewItem>> {
        let _gate = self.gate().await;
        let items = log_failure("list", self.load_items().await)?;

        let mut state = self.state.write().await;
        state.items = items.clone();
        let edited_gone = state
            .editing
            .as_ref()
            .is_some_and(|session| state.find(&session.id).is_none());
        if edited_gone {
            debug!("Item under edit is no longer listed, leaving edit mode");
            state.editing = None;
        }
        drop(state);

        debug!(count = items.len(), "Loaded bucket items");
        Ok(items)
    }

    async fn create_item(
        &self,
        title: &str,
        image: Option<ImageUpload>,
    ) -> WorkflowResult<Option<ViewItem>> {
        let Some(title) = Title::parse(title) else {
            debug!("Ignoring create with blank title");
            return Ok(None);
        };

        let _gate = self.gate().await;
        let item = log_failure("create", self.create_inner(title, image).await)?;
        info!(item_id = %item.id, has_image = item.image_key.is_some(), "Created bucket item");
        Ok(Some(item))
    }

    async fn update_item(
        &self,
        id: &ItemId,
        title: &str,
        replacement_image: Option<ImageUpload>,
    ) -> WorkflowResult<Option<ViewItem>> {
        let Some(title) = Title::parse(title) else {
            debug!(item_id = %id, "Ignoring update with blank title");
            return Ok(None);
        };

        let _gate = self.gate().await;
        let item = log_failure(
            "update",
            self.update_inner(id, title, replacement_image).await,
        )?;
        info!(item_id = %item.id, "Updated bucket item");
        Ok(Some(item))
    }

    async fn delete_item(&self, id: &ItemId) -> WorkflowResult<bool> {
        let _gate = self.gate().await;
        let removed = log_failure("delete", self.delete_inner(id).await)?;
        info!(item_id = %id, removed_locally = removed, "Deleted bucket item");
        Ok(removed)
    }

    async fn begin_edit(&self, id: &ItemId) -> WorkflowResult<EditSession> {
        let mut state = self.state.write().await;
        let session = state
            .find(id)
            .map(EditSession::begin)
            .ok_or_else(|| WorkflowError::UnknownItem { id: id.clone() })?;

        if let Some(abandoned) = state.editing.replace(session.clone()) {
            if abandoned.id != *id {
                debug!(abandoned = %abandoned.id, item_id = %id, "Abandoning unsaved edit");
            }
        }
        Ok(session)
    }

    async fn cancel_edit(&self) -> Option<EditSession> {
        self.state.write().await.editing.take()
    }

    async fn items(&self) -> Vec<ViewItem> {
        self.state.read().await.items.clone()
    }
}

/// Builder for ItemWorkflowController
pub struct ItemWorkflowBuilder {
    repository: Option<Arc<dyn BucketItemRepository>>,
    images: Option<Arc<dyn ImageStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    clock: Option<Arc<dyn Clock>>,
    config: WorkflowConfig,
}

impl ItemWorkflowBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            images: None,
            identity: None,
            clock: None,
            config: WorkflowConfig::default(),
        }
    }

    pub fn repository(mut self, repository: Arc<dyn BucketItemRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn images(mut self, images: Arc<dyn ImageStore>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ItemWorkflowController, &'static str> {
        let repository = self.repository.ok_or("Repository is required")?;
        let images = self.images.ok_or("Image store is required")?;
        let identity = self.identity.ok_or("Identity provider is required")?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(ItemWorkflowController::new(
            repository,
            images,
            identity,
            clock,
            self.config,
        ))
    }
}

impl Default for ItemWorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
