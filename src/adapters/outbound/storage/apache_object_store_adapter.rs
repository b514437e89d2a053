use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration as ChronoDuration, Utc};
use object_store::{
    Attribute, Attributes, ObjectStore as ApacheObjectStore, PutOptions, PutPayload,
    path::Path as ObjectPath, signer::Signer,
};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::RetrievalUrl,
        value_objects::ImageKey,
    },
    ports::storage::ImageStore,
};

/// Default lifetime of a retrieval URL
pub const DEFAULT_URL_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// How retrieval URLs are produced
#[derive(Clone)]
enum UrlStrategy {
    /// Presigned URLs from the backend (S3 and friends)
    Signed(Arc<dyn Signer>),
    /// `<base>/<key>?expires=<unix seconds>` for backends that cannot sign
    Unsigned { base_url: String },
}

/// Adapter that implements our ImageStore trait using Apache object_store
#[derive(Clone)]
pub struct ApacheObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
    urls: UrlStrategy,
    url_expiry: Duration,
}

impl ApacheObjectStoreAdapter {
    /// Wrap a store that cannot presign; URLs are built under `base_url`
    pub fn new(store: Arc<dyn ApacheObjectStore>, base_url: impl Into<String>) -> Self {
        Self {
            inner: store,
            urls: UrlStrategy::Unsigned {
                base_url: base_url.into().trim_end_matches('/').to_string(),
            },
            url_expiry: DEFAULT_URL_EXPIRY,
        }
    }

    /// Wrap a store whose retrieval URLs are presigned by `signer`
    pub fn with_signer(store: Arc<dyn ApacheObjectStore>, signer: Arc<dyn Signer>) -> Self {
        Self {
            inner: store,
            urls: UrlStrategy::Signed(signer),
            url_expiry: DEFAULT_URL_EXPIRY,
        }
    }

    pub fn with_url_expiry(mut self, expiry: Duration) -> Self {
        self.url_expiry = expiry;
        self
    }

    fn map_error(key: &ImageKey, operation: &str, e: object_store::Error) -> StorageError {
        match e {
            object_store::Error::NotFound { .. } => {
                StorageError::ObjectNotFound { key: key.clone() }
            }
            object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. } => StorageError::AccessDenied {
                key: key.clone(),
                operation: operation.to_string(),
            },
            object_store::Error::NotImplemented { .. } => StorageError::UnsupportedOperation {
                operation: operation.to_string(),
                reason: "Not supported by this object store".to_string(),
            },
            _ => StorageError::InfrastructureError {
                message: format!("Failed to {}: {}", operation, e),
                source: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl ImageStore for ApacheObjectStoreAdapter {
    async fn put_image(
        &self,
        key: &ImageKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ImageKey> {
        let path = ObjectPath::from(key.as_str());
        let payload = PutPayload::from(data);

        let mut attributes = Attributes::new();
        if let Some(content_type) = content_type {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner
            .put_opts(&path, payload, options)
            .await
            .map_err(|e| Self::map_error(key, "put object", e))?;

        Ok(key.clone())
    }

    async fn retrieval_url(&self, key: &ImageKey) -> StorageResult<RetrievalUrl> {
        let path = ObjectPath::from(key.as_str());
        let expires_at = Utc::now()
            + ChronoDuration::from_std(self.url_expiry).map_err(|e| {
                StorageError::ValidationError {
                    message: format!("URL expiry out of range: {}", e),
                }
            })?;

        match &self.urls {
            UrlStrategy::Signed(signer) => {
                let url = signer
                    .signed_url(http::Method::GET, &path, self.url_expiry)
                    .await
                    .map_err(|e| Self::map_error(key, "sign URL", e))?;

                Ok(RetrievalUrl {
                    url: url.to_string(),
                    expires_at,
                })
            }
            UrlStrategy::Unsigned { base_url } => {
                // Unsigned URLs are only handed out for blobs that exist.
                self.inner
                    .head(&path)
                    .await
                    .map_err(|e| Self::map_error(key, "resolve URL", e))?;

                Ok(RetrievalUrl {
                    url: format!("{}/{}?expires={}", base_url, path, expires_at.timestamp()),
                    expires_at,
                })
            }
        }
    }
}
