mod bucket_item_repository;

pub use bucket_item_repository::BucketItemRepository;
