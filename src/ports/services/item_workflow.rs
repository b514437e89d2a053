use async_trait::async_trait;

use crate::domain::{
    errors::WorkflowResult,
    models::{EditSession, ImageUpload, ViewItem},
    value_objects::ItemId,
};

/// Port for the bucket list workflow: every list-mutating user action goes
/// through here.
#[async_trait]
pub trait ItemWorkflow: Send + Sync + 'static {
    /// Reload every item of the current caller, replacing the local list
    async fn refresh(&self) -> WorkflowResult<Vec<ViewItem>>;

    /// Create an item, uploading `image` first when present.
    ///
    /// Returns `Ok(None)` without touching anything when `title` is blank.
    async fn create_item(
        &self,
        title: &str,
        image: Option<ImageUpload>,
    ) -> WorkflowResult<Option<ViewItem>>;

    /// Update the item currently being edited.
    ///
    /// Returns `Ok(None)` without touching anything when `title` is blank.
    async fn update_item(
        &self,
        id: &ItemId,
        title: &str,
        replacement_image: Option<ImageUpload>,
    ) -> WorkflowResult<Option<ViewItem>>;

    /// Delete an item; returns whether it was present in the local list
    async fn delete_item(&self, id: &ItemId) -> WorkflowResult<bool>;

    /// Enter edit mode for `id`, abandoning any other edit in progress
    async fn begin_edit(&self, id: &ItemId) -> WorkflowResult<EditSession>;

    /// Leave edit mode without saving
    async fn cancel_edit(&self) -> Option<EditSession>;

    /// Snapshot of the local list
    async fn items(&self) -> Vec<ViewItem>;
}
