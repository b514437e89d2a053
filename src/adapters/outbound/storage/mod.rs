// Storage implementations
pub mod apache_object_store_adapter;
pub mod s3_store;

// Re-export key types
pub use apache_object_store_adapter::{ApacheObjectStoreAdapter, DEFAULT_URL_EXPIRY};
pub use s3_store::{S3Config, create_s3_image_store, create_s3_store};
