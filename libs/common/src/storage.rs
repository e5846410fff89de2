//! Object storage module
//!
//! Conversation transcripts live in an S3-compatible bucket as whole JSON
//! documents. This module hides the backend behind the [`ObjectStore`] trait so
//! the gateway can run against S3/MinIO in production and an in-memory map in
//! tests.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, timeout::TimeoutConfig};
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::error::{StorageError, StorageResult};

/// Object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Custom endpoint for S3-compatible services such as MinIO
    pub endpoint_url: Option<String>,
    /// Static access key, falls back to the default AWS credential chain
    pub access_key_id: Option<String>,
    /// Static secret key, falls back to the default AWS credential chain
    pub secret_access_key: Option<String>,
    /// Bucket region
    pub region: String,
    /// Bucket holding the conversation documents
    pub bucket_name: String,
    /// Upper bound for a single storage operation
    pub operation_timeout: Duration,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `S3_ENDPOINT_URL`: Custom S3 endpoint (default: AWS)
    /// - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`: Static credentials (optional)
    /// - `AWS_REGION`: Region (default: "us-east-1")
    /// - `S3_BUCKET_NAME`: Bucket name (default: "chat-conversations")
    /// - `STORAGE_TIMEOUT_SECS`: Operation timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let operation_timeout = env::var("STORAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Self {
            endpoint_url: env::var("S3_ENDPOINT_URL").ok().filter(|s| !s.is_empty()),
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok().filter(|s| !s.is_empty()),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket_name: env::var("S3_BUCKET_NAME")
                .unwrap_or_else(|_| "chat-conversations".to_string()),
            operation_timeout: Duration::from_secs(operation_timeout),
        }
    }
}

/// Key/value blob storage used for conversation documents
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object body, `None` when the key does not exist
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Write an object, replacing any previous body and metadata
    async fn put(&self, key: &str, body: Vec<u8>, metadata: &[(String, String)])
    -> StorageResult<()>;

    /// Check whether a key exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Remove an object
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List every key starting with `prefix`
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

fn backend_error<E>(err: E) -> StorageError
where
    E: std::error::Error + 'static,
{
    StorageError::Backend(DisplayErrorContext(&err).to_string())
}

/// S3-backed object store
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket_name: String,
    region: String,
}

impl S3ObjectStore {
    /// Build an S3 client from the configuration
    pub async fn connect(config: &StorageConfig) -> StorageResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.operation_timeout)
                    .build(),
            );

        match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                loader = loader.credentials_provider(Credentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    "environment",
                ));
            }
            (None, None) => {}
            _ => {
                return Err(StorageError::Configuration(
                    "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
                ));
            }
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            // MinIO and friends only speak path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            "S3 client initialized for bucket {} in {}",
            config.bucket_name, config.region
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket_name: config.bucket_name.clone(),
            region: config.region.clone(),
        })
    }

    /// Create the bucket if it does not exist yet
    pub async fn ensure_bucket(&self) -> StorageResult<()> {
        match self
            .client
            .head_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            Ok(_) => {
                info!("S3 bucket '{}' exists", self.bucket_name);
                Ok(())
            }
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {
                let mut request = self.client.create_bucket().bucket(&self.bucket_name);
                if self.region != "us-east-1" {
                    request = request.create_bucket_configuration(
                        CreateBucketConfiguration::builder()
                            .location_constraint(BucketLocationConstraint::from(
                                self.region.as_str(),
                            ))
                            .build(),
                    );
                }
                request.send().await.map_err(|e| {
                    error!("Failed to create bucket {}: {}", self.bucket_name, e);
                    backend_error(e)
                })?;
                info!("Created S3 bucket: {}", self.bucket_name);
                Ok(())
            }
            Err(err) => {
                error!("Error accessing bucket {}: {}", self.bucket_name, err);
                Err(backend_error(err))
            }
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::Body(e.to_string()))?
                    .into_bytes();
                Ok(Some(bytes.to_vec()))
            }
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => Ok(None),
            Err(err) => Err(backend_error(err)),
        }
    }

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        metadata: &[(String, String)],
    ) -> StorageResult<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body));

        for (name, value) in metadata {
            request = request.metadata(name, value);
        }

        request.send().await.map_err(backend_error)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(backend_error(err)),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket_name)
                .prefix(prefix);

            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(backend_error)?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(str::to_string)),
            );

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(keys)
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    metadata: Vec<(String, String)>,
}

/// In-memory object store for tests and local development
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata attached to an object by the last write
    pub async fn metadata(&self, key: &str) -> Option<Vec<(String, String)>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.metadata.clone())
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self
            .objects
            .read()
            .await
            .get(key)
            .map(|object| object.body.clone()))
    }

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        metadata: &[(String, String)],
    ) -> StorageResult<()> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                body,
                metadata: metadata.to_vec(),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .objects
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
