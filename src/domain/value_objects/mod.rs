mod image_key;
mod item_id;
mod title;
mod username;

pub use image_key::{DEFAULT_IMAGE_NAMESPACE, ImageKey};
pub use item_id::ItemId;
pub use title::Title;
pub use username::Username;
