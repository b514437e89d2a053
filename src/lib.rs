pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Models
    BucketItem,
    Draft,
    EditSession,
    // Errors
    DomainValidationError,
    IdentityError,
    // Value objects
    ImageKey,
    ImageUpload,
    ItemId,
    RecordStoreError,
    RetrievalUrl,
    StorageError,
    Title,
    Username,
    ViewItem,
    ViewState,
    WorkflowError,
    merge_display_fields,
};

// Port types - interfaces for external systems
pub use ports::{
    BucketItemRepository, Caller, Clock, FixedClock, IdentityProvider, ImageStore, ItemWorkflow,
    SystemClock,
};

// Service implementations - business logic
pub use services::{ItemWorkflowBuilder, ItemWorkflowController, WorkflowConfig};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppDependencies, AppError, AppServices, RepositoryBackend,
    StorageBackend, config_from_env, config_from_vars, create_app_from_env,
    create_in_memory_app,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    identity::StaticIdentityProvider,
    persistence::{InMemoryBucketItemRepository, SqlBucketItemRepository},
    storage::ApacheObjectStoreAdapter,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        ApacheObjectStoreAdapter, AppBuilder, AppServices, BucketItemRepository, ImageStore,
        ImageUpload, InMemoryBucketItemRepository, ItemId, ItemWorkflow, ItemWorkflowController,
        StaticIdentityProvider, ViewItem, WorkflowConfig, create_in_memory_app,
    };
}
