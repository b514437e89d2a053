use object_store::memory::InMemory;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    adapters::outbound::{
        identity::StaticIdentityProvider,
        persistence::{InMemoryBucketItemRepository, SqlBucketItemRepository},
        storage::{ApacheObjectStoreAdapter, S3Config, create_s3_image_store},
    },
    domain::value_objects::{DEFAULT_IMAGE_NAMESPACE, Username},
    ports::{
        clock::{Clock, SystemClock},
        identity::IdentityProvider,
        repositories::BucketItemRepository,
        storage::ImageStore,
    },
    services::{ItemWorkflowController, WorkflowConfig},
};

/// Default lifetime of image retrieval URLs, in seconds
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 900;

/// Base of the unsigned URLs handed out by the in-memory image store
pub const DEFAULT_PUBLIC_BASE_URL: &str = "memory://bucket-images";

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub repository_backend: RepositoryBackend,
    /// Login name of the signed-in caller
    pub username: String,
    pub image_namespace: String,
    pub url_expiry_secs: u64,
    pub serialize_actions: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::InMemory {
                public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            },
            repository_backend: RepositoryBackend::InMemory,
            username: "guest".to_string(),
            image_namespace: DEFAULT_IMAGE_NAMESPACE.to_string(),
            url_expiry_secs: DEFAULT_URL_EXPIRY_SECS,
            serialize_actions: false,
        }
    }
}

/// Image storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory {
        public_base_url: String,
    },
    S3 {
        bucket: String,
        region: String,
        access_key: Option<String>,
        secret_key: Option<String>,
        endpoint: Option<String>,
    },
}

/// Record store backend configuration
#[derive(Debug, Clone)]
pub enum RepositoryBackend {
    InMemory,
    Database { connection_string: String },
}

/// Application dependencies container
pub struct AppDependencies {
    pub repository: Arc<dyn BucketItemRepository>,
    pub image_store: Arc<dyn ImageStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub clock: Arc<dyn Clock>,
}

/// Application services container
pub struct AppServices {
    pub workflow: ItemWorkflowController,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    clock: Arc<dyn Clock>,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure image storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Configure record store backend
    pub fn with_repository_backend(mut self, backend: RepositoryBackend) -> Self {
        self.config.repository_backend = backend;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the application dependencies
    pub async fn build_dependencies(self) -> Result<AppDependencies, AppError> {
        let image_store = self.create_image_store()?;
        let repository = self.create_repository().await?;

        let username =
            Username::new(self.config.username.clone()).map_err(|e| AppError::Configuration {
                message: format!("Invalid username '{}': {}", self.config.username, e),
            })?;

        Ok(AppDependencies {
            repository,
            image_store,
            identity: Arc::new(StaticIdentityProvider::new(username)),
            clock: self.clock,
        })
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let workflow_config = WorkflowConfig {
            image_namespace: self.config.image_namespace.clone(),
            serialize_actions: self.config.serialize_actions,
        };
        if workflow_config.image_namespace.trim_matches('/').is_empty() {
            return Err(AppError::Configuration {
                message: "Image namespace cannot be empty".to_string(),
            });
        }

        let deps = self.build_dependencies().await?;

        let workflow = ItemWorkflowController::new(
            deps.repository,
            deps.image_store,
            deps.identity,
            deps.clock,
            workflow_config,
        );

        Ok(AppServices { workflow })
    }

    fn url_expiry(&self) -> Duration {
        Duration::from_secs(self.config.url_expiry_secs)
    }

    /// Create the image store based on configuration
    fn create_image_store(&self) -> Result<Arc<dyn ImageStore>, AppError> {
        match &self.config.storage_backend {
            StorageBackend::InMemory { public_base_url } => Ok(Arc::new(
                ApacheObjectStoreAdapter::new(Arc::new(InMemory::new()), public_base_url.clone())
                    .with_url_expiry(self.url_expiry()),
            )),
            StorageBackend::S3 {
                bucket,
                region,
                access_key,
                secret_key,
                endpoint,
            } => {
                let config = S3Config {
                    bucket: bucket.clone(),
                    region: region.clone(),
                    access_key: access_key.clone(),
                    secret_key: secret_key.clone(),
                    endpoint: endpoint.clone(),
                };
                let store = create_s3_image_store(&config, self.url_expiry()).map_err(|e| {
                    AppError::StorageInit {
                        message: format!("{:#}", e),
                    }
                })?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Create the record store based on configuration
    async fn create_repository(&self) -> Result<Arc<dyn BucketItemRepository>, AppError> {
        match &self.config.repository_backend {
            RepositoryBackend::InMemory => Ok(Arc::new(InMemoryBucketItemRepository::with_clock(
                self.clock.clone(),
            ))),
            RepositoryBackend::Database { connection_string } => {
                let repository = SqlBucketItemRepository::connect(connection_string)
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to connect to database: {}", e),
                    })?;
                repository
                    .migrate()
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to migrate database: {}", e),
                    })?;
                Ok(Arc::new(repository))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("Repository initialization error: {message}")]
    RepositoryInit { message: String },
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app(username: &str) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory {
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        })
        .with_repository_backend(RepositoryBackend::InMemory)
        .with_username(username)
        .build()
        .await
}

fn required_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    lookup(name).ok_or_else(|| AppError::Configuration {
        message: format!("{} environment variable required", name),
    })
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| AppError::Configuration {
            message: format!("{} has an invalid value: '{}'", name, value),
        }),
        None => Ok(default),
    }
}

/// Read the application configuration from environment variables
pub fn config_from_env() -> Result<AppConfig, AppError> {
    config_from_vars(|name| std::env::var(name).ok())
}

/// Build the application configuration from named variables, as read by `lookup`
pub fn config_from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, AppError> {
    let defaults = AppConfig::default();

    let storage_backend = match lookup("STORAGE_BACKEND").as_deref() {
        Some("s3") => StorageBackend::S3 {
            bucket: required_var(&lookup, "S3_BUCKET")?,
            region: lookup("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            access_key: lookup("S3_ACCESS_KEY"),
            secret_key: lookup("S3_SECRET_KEY"),
            endpoint: lookup("S3_ENDPOINT"),
        },
        Some("memory") | None => StorageBackend::InMemory {
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
        },
        Some(other) => {
            return Err(AppError::Configuration {
                message: format!("Unknown storage backend: {}", other),
            });
        }
    };

    let repository_backend = match lookup("REPOSITORY_BACKEND").as_deref() {
        Some("database") | Some("db") => RepositoryBackend::Database {
            connection_string: required_var(&lookup, "DATABASE_URL")?,
        },
        Some("memory") | None => RepositoryBackend::InMemory,
        Some(other) => {
            return Err(AppError::Configuration {
                message: format!("Unknown repository backend: {}", other),
            });
        }
    };

    Ok(AppConfig {
        storage_backend,
        repository_backend,
        username: lookup("BUCKET_LIST_USER").unwrap_or(defaults.username),
        image_namespace: lookup("IMAGE_NAMESPACE").unwrap_or(defaults.image_namespace),
        url_expiry_secs: parse_var(&lookup, "IMAGE_URL_EXPIRY_SECS", defaults.url_expiry_secs)?,
        serialize_actions: parse_var(&lookup, "SERIALIZE_ACTIONS", defaults.serialize_actions)?,
    })
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    AppBuilder::new().with_config(config_from_env()?).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::services::ItemWorkflow;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_create_in_memory_app() {
        let app = create_in_memory_app("alice").await.unwrap();

        assert_eq!(app.workflow.display_name().unwrap(), "Alice");
        assert!(app.workflow.refresh().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_app_builder_rejects_bad_username() {
        let result = AppBuilder::new().with_username("not valid").build().await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_app_builder_rejects_empty_namespace() {
        let config = AppConfig {
            image_namespace: "/".to_string(),
            ..AppConfig::default()
        };
        let result = AppBuilder::new().with_config(config).build().await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_dependencies_creation() {
        let deps = AppBuilder::new()
            .with_username("bob")
            .build_dependencies()
            .await
            .unwrap();

        assert_eq!(deps.identity.current_caller().unwrap().username.as_str(), "bob");
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_config_from_vars_defaults() {
        let config = config_from_vars(vars(&[])).unwrap();

        assert!(matches!(
            config.storage_backend,
            StorageBackend::InMemory { ref public_base_url } if public_base_url == DEFAULT_PUBLIC_BASE_URL
        ));
        assert!(matches!(config.repository_backend, RepositoryBackend::InMemory));
        assert_eq!(config.username, "guest");
        assert_eq!(config.image_namespace, DEFAULT_IMAGE_NAMESPACE);
        assert_eq!(config.url_expiry_secs, DEFAULT_URL_EXPIRY_SECS);
        assert!(!config.serialize_actions);
    }

    #[test]
    fn test_config_from_vars_s3_and_database() {
        let config = config_from_vars(vars(&[
            ("STORAGE_BACKEND", "s3"),
            ("S3_BUCKET", "goals"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("REPOSITORY_BACKEND", "db"),
            ("DATABASE_URL", "postgres://localhost/bucket_list"),
            ("BUCKET_LIST_USER", "alice"),
            ("IMAGE_URL_EXPIRY_SECS", " 60 "),
            ("SERIALIZE_ACTIONS", "true"),
        ]))
        .unwrap();

        match config.storage_backend {
            StorageBackend::S3 {
                bucket,
                region,
                endpoint,
                access_key,
                ..
            } => {
                assert_eq!(bucket, "goals");
                assert_eq!(region, "us-east-1");
                assert_eq!(endpoint.as_deref(), Some("http://localhost:9000"));
                assert!(access_key.is_none());
            }
            other => panic!("unexpected backend {:?}", other),
        }
        assert!(matches!(config.repository_backend, RepositoryBackend::Database { .. }));
        assert_eq!(config.username, "alice");
        assert_eq!(config.url_expiry_secs, 60);
        assert!(config.serialize_actions);
    }

    #[test]
    fn test_config_from_vars_rejects_bad_input() {
        let cases: &[&[(&str, &str)]] = &[
            &[("STORAGE_BACKEND", "s3")],
            &[("STORAGE_BACKEND", "ftp")],
            &[("REPOSITORY_BACKEND", "database")],
            &[("REPOSITORY_BACKEND", "redis")],
            &[("IMAGE_URL_EXPIRY_SECS", "soon")],
            &[("SERIALIZE_ACTIONS", "1")],
        ];

        for case in cases {
            assert!(
                matches!(config_from_vars(vars(case)), Err(AppError::Configuration { .. })),
                "expected rejection of {:?}",
                case
            );
        }
    }

    #[tokio::test]
    async fn test_app_from_in_memory_config() {
        let config = config_from_vars(vars(&[("BUCKET_LIST_USER", "carol")])).unwrap();
        let app = AppBuilder::new().with_config(config).build().await.unwrap();

        assert_eq!(app.workflow.display_name().unwrap(), "Carol");
    }

    // The only test in this crate that touches the process environment.
    #[tokio::test]
    async fn test_create_app_from_env() {
        for (name, value) in [
            ("STORAGE_BACKEND", "memory"),
            ("REPOSITORY_BACKEND", "memory"),
            ("BUCKET_LIST_USER", "dave"),
            ("IMAGE_NAMESPACE", "goals"),
            ("IMAGE_URL_EXPIRY_SECS", "120"),
            ("SERIALIZE_ACTIONS", "true"),
        ] {
            std::env::set_var(name, value);
        }

        let app = create_app_from_env().await.unwrap();

        assert_eq!(app.workflow.display_name().unwrap(), "Dave");
        assert_eq!(app.workflow.config().image_namespace, "goals");
        assert!(app.workflow.config().serialize_actions);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.image_namespace, "bucket-images");
        assert_eq!(config.url_expiry_secs, 900);
        assert!(!config.serialize_actions);
        assert!(matches!(config.repository_backend, RepositoryBackend::InMemory));
    }
}
