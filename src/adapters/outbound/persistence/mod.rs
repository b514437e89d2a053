mod in_memory_bucket_item_repository;
mod sql_bucket_item_repository;

pub use in_memory_bucket_item_repository::InMemoryBucketItemRepository;
pub use sql_bucket_item_repository::SqlBucketItemRepository;
