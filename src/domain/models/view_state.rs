use crate::domain::{
    models::{ImageUpload, ViewItem},
    value_objects::ItemId,
};

/// The compose form for a new item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub title: String,
    pub image: Option<ImageUpload>,
}

impl Draft {
    /// Drives the "image selected" indicator
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.image = None;
    }
}

/// The single in-progress edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub id: ItemId,
    pub title: String,
    pub replacement_image: Option<ImageUpload>,
}

impl EditSession {
    /// Start editing `item`, seeded with its current title
    pub fn begin(item: &ViewItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.as_str().to_string(),
            replacement_image: None,
        }
    }
}

/// Everything the controller shows to the user
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Always sorted ascending by `created_at`
    pub items: Vec<ViewItem>,
    pub draft: Draft,
    pub editing: Option<EditSession>,
}

impl ViewState {
    pub fn find(&self, id: &ItemId) -> Option<&ViewItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn is_editing(&self, id: &ItemId) -> bool {
        self.editing.as_ref().is_some_and(|session| &session.id == id)
    }
}
