//! Amazon S3 (and S3-compatible) image storage built on the object_store crate

use anyhow::{Context, Result};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use std::sync::Arc;
use std::time::Duration;

use super::ApacheObjectStoreAdapter;

/// Configuration for S3 storage backend
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> Result<Arc<AmazonS3>> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
    }

    let store = builder.build().context("Failed to build S3 store")?;

    Ok(Arc::new(store))
}

/// Image store over S3 handing out presigned GET URLs
pub fn create_s3_image_store(
    config: &S3Config,
    url_expiry: Duration,
) -> Result<ApacheObjectStoreAdapter> {
    let store = create_s3_store(config)?;
    Ok(ApacheObjectStoreAdapter::with_signer(store.clone(), store).with_url_expiry(url_expiry))
}
