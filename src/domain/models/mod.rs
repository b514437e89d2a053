pub mod bucket_item;
pub mod image;
pub mod view_state;

pub use bucket_item::*;
pub use image::*;
pub use view_state::*;
