//! Common library for the organization chat gateway
//!
//! This crate provides shared infrastructure used by the gateway services:
//! PostgreSQL connectivity for the credential store, the object storage
//! abstraction holding conversation transcripts, and the matching error types.

pub mod database;
pub mod error;
pub mod storage;

/// Example usage of the storage module
///
/// ```rust,no_run
/// use common::storage::{ObjectStore, S3ObjectStore, StorageConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = StorageConfig::from_env();
///     let store = S3ObjectStore::connect(&config).await?;
///     store.ensure_bucket().await?;
///     store.put("conversations/demo/hello.json", b"{}".to_vec(), &[]).await?;
///     println!("Stored objects: {:?}", store.list("conversations/demo/").await?);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
