//! # contract: the object-store interface used by setup and sync
//!
//! This module defines a single trait ([`BucketStore`]) and the plain data types
//! passed across it. Everything webotron does remotely (create a bucket, apply
//! a policy, enable website hosting, list, upload) is one call on this trait.
//!
//! ## Interface & Extensibility
//! - Implement [`BucketStore`] to target a new backend (S3, an S3-compatible
//!   service, a local fake).
//! - All methods are async and return [`StoreError`].
//! - A create-bucket call on a bucket the caller already owns must return
//!   [`StoreError::BucketAlreadyOwnedByYou`]; setup relies on it to stay idempotent.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests get `MockBucketStore`.

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::StoreError;

/// A bucket that exists and is reachable by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
}

impl Bucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub name: String,
    /// Creation time as reported by the service (RFC 3339), if any.
    pub created: Option<String>,
}

/// One entry of an object listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<String>,
}

/// Index and error documents served by a website bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteConfig {
    /// Suffix appended to directory requests (e.g. `index.html`).
    pub index_document: String,
    /// Key of the object returned on 4xx errors.
    pub error_document: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
        }
    }
}

/// A single file to write into a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub bucket: String,
    /// Local file whose bytes become the object body.
    pub path: PathBuf,
    pub key: String,
    pub content_type: String,
}

/// Trait for managing website buckets and their objects.
/// The implementor is responsible for connecting to a backing service or storage API.
///
/// Uploading to an existing key overwrites it.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Create a bucket with the given name.
    async fn create_bucket(&self, name: &str) -> Result<Bucket, StoreError>;

    /// Replace the bucket's access policy with the given JSON document.
    async fn put_bucket_policy(&self, bucket: &Bucket, policy: &str) -> Result<(), StoreError>;

    /// Enable static website hosting on the bucket.
    async fn put_bucket_website(
        &self,
        bucket: &Bucket,
        website: &WebsiteConfig,
    ) -> Result<(), StoreError>;

    /// List every bucket visible to the caller.
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StoreError>;

    /// List every object in the named bucket.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError>;

    /// Write a local file into the bucket under the given key.
    async fn upload_file(&self, req: UploadRequest) -> Result<(), StoreError>;
}
