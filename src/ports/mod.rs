pub mod clock;
pub mod identity;
pub mod repositories;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::{Caller, IdentityProvider};
pub use repositories::BucketItemRepository;
pub use services::ItemWorkflow;
pub use storage::ImageStore;
