//! Website bucket setup: create (or reuse) a bucket, make it publicly
//! readable, and turn on static website hosting.
//!
//! Every step goes through a [`BucketStore`], so the whole sequence can run
//! against a mock. Running [`setup_bucket`] on a bucket the caller already
//! owns reapplies the policy and website configuration instead of failing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use tracing::{error, info};

use crate::contract::{Bucket, BucketStore, WebsiteConfig};
use crate::error::{SetupError, StoreError};

static BUCKET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9.-]*[a-z0-9]$").expect("bucket name pattern is valid")
});

static IPV4_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("ipv4 pattern is valid")
});

/// Result of [`setup_bucket`].
#[derive(Debug, Clone)]
pub struct BucketSetup {
    pub bucket: Bucket,
    /// False when the bucket already existed and was reused.
    pub newly_created: bool,
    pub website: WebsiteConfig,
}

/// Check a name against the S3 bucket naming rules.
pub fn validate_bucket_name(name: &str) -> Result<(), SetupError> {
    let invalid = |reason| SetupError::InvalidBucketName {
        name: name.to_string(),
        reason,
    };

    if !(3..=63).contains(&name.len()) {
        return Err(invalid("must be between 3 and 63 characters long"));
    }
    if !BUCKET_NAME.is_match(name) {
        return Err(invalid(
            "may only contain lowercase letters, digits, '.' and '-', and must start and end with a letter or digit",
        ));
    }
    if name.contains("..") {
        return Err(invalid("must not contain two adjacent periods"));
    }
    if IPV4_LIKE.is_match(name) {
        return Err(invalid("must not be formatted as an IP address"));
    }
    if name.starts_with("xn--") {
        return Err(invalid("must not start with the reserved prefix 'xn--'"));
    }
    if name.ends_with("-s3alias") {
        return Err(invalid("must not end with the reserved suffix '-s3alias'"));
    }
    Ok(())
}

/// Render the public-read policy for a bucket.
pub fn public_read_policy(bucket: &str) -> Result<String, serde_json::Error> {
    let policy = json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": "*",
            "Action": ["s3:GetObject"],
            "Resource": [format!("arn:aws:s3:::{bucket}/*")]
        }]
    });
    serde_json::to_string_pretty(&policy)
}

/// Create the bucket, or reuse it if the caller already owns it.
///
/// Returns the bucket and whether it was newly created.
pub async fn init_bucket<S>(store: &S, name: &str) -> Result<(Bucket, bool), SetupError>
where
    S: BucketStore + ?Sized,
{
    validate_bucket_name(name)?;

    match store.create_bucket(name).await {
        Ok(bucket) => {
            info!(bucket = %bucket.name, "[SETUP] Created bucket");
            Ok((bucket, true))
        }
        Err(StoreError::BucketAlreadyOwnedByYou { .. }) => {
            info!(bucket = name, "[SETUP] Bucket already owned by caller, reusing it");
            Ok((Bucket::new(name), false))
        }
        Err(e) => {
            error!(bucket = name, error = %e, "[SETUP][ERROR] Failed to create bucket");
            Err(e.into())
        }
    }
}

/// Make every object in the bucket publicly readable.
pub async fn set_policy<S>(store: &S, bucket: &Bucket) -> Result<(), SetupError>
where
    S: BucketStore + ?Sized,
{
    let policy = public_read_policy(&bucket.name)?;
    store.put_bucket_policy(bucket, &policy).await.map_err(|e| {
        error!(bucket = %bucket.name, error = %e, "[SETUP][ERROR] Failed to apply bucket policy");
        e
    })?;
    info!(bucket = %bucket.name, "[SETUP] Applied public-read policy");
    Ok(())
}

/// Enable static website hosting with the given index and error documents.
pub async fn configure_website<S>(
    store: &S,
    bucket: &Bucket,
    website: &WebsiteConfig,
) -> Result<(), SetupError>
where
    S: BucketStore + ?Sized,
{
    store.put_bucket_website(bucket, website).await.map_err(|e| {
        error!(bucket = %bucket.name, error = %e, "[SETUP][ERROR] Failed to configure website hosting");
        e
    })?;
    info!(
        bucket = %bucket.name,
        index = %website.index_document,
        error_document = %website.error_document,
        "[SETUP] Configured website hosting"
    );
    Ok(())
}

/// Create or reuse the bucket, apply the public-read policy, and enable website hosting.
pub async fn setup_bucket<S>(
    store: &S,
    name: &str,
    website: &WebsiteConfig,
) -> Result<BucketSetup, SetupError>
where
    S: BucketStore + ?Sized,
{
    let (bucket, newly_created) = init_bucket(store, name).await?;
    set_policy(store, &bucket).await?;
    configure_website(store, &bucket, website).await?;
    Ok(BucketSetup {
        bucket,
        newly_created,
        website: website.clone(),
    })
}
