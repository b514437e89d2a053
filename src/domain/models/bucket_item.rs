use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::domain::{
    models::RetrievalUrl,
    value_objects::{ImageKey, ItemId, Title},
};

/// A bucket item as persisted by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketItem {
    pub id: ItemId,
    pub title: Title,
    pub image_key: Option<ImageKey>,
    pub created_at: DateTime<Utc>,
}

/// Input of the record store's create mutation
#[derive(Debug, Clone, PartialEq)]
pub struct NewBucketItem {
    pub title: Title,
    pub image_key: Option<ImageKey>,
}

/// Input of the record store's update mutation
#[derive(Debug, Clone, PartialEq)]
pub struct BucketItemUpdate {
    pub id: ItemId,
    pub title: Title,
    pub image_key: Option<ImageKey>,
}

/// A bucket item as presented to the user: the stored record plus the
/// retrieval URL resolved for its image, if any.
///
/// Serializes `imageUrl` as the bare URL, with its expiry alongside in
/// `imageUrlExpiresAt`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewItem {
    pub id: ItemId,
    pub title: Title,
    pub image_key: Option<ImageKey>,
    pub created_at: DateTime<Utc>,
    pub image_url: Option<RetrievalUrl>,
}

impl ViewItem {
    pub fn image_url_str(&self) -> Option<&str> {
        self.image_url.as_ref().map(|u| u.url.as_str())
    }
}

impl Serialize for ViewItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut item = serializer.serialize_struct("ViewItem", 6)?;
        item.serialize_field("id", &self.id)?;
        item.serialize_field("title", &self.title)?;
        item.serialize_field("imageKey", &self.image_key)?;
        item.serialize_field("createdAt", &self.created_at)?;
        item.serialize_field("imageUrl", &self.image_url_str())?;
        item.serialize_field(
            "imageUrlExpiresAt",
            &self.image_url.as_ref().map(|u| u.expires_at),
        )?;
        item.end()
    }
}

/// Splice a locally resolved image URL into a record returned by the store.
///
/// Store responses never carry a display URL, so whichever URL the caller
/// resolved is attached as-is.
pub fn merge_display_fields(record: BucketItem, image_url: Option<RetrievalUrl>) -> ViewItem {
    ViewItem {
        id: record.id,
        title: record.title,
        image_key: record.image_key,
        created_at: record.created_at,
        image_url,
    }
}

/// Stable ascending sort on `created_at`
pub fn sort_by_created_at(items: &mut [ViewItem]) {
    items.sort_by_key(|item| item.created_at);
}
