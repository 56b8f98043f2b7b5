#![doc = "S3 implementation of the webotron-core BucketStore contract."]
//
//! # S3 Integration (CLI <-> Core)
//!
//! This module wires the [`BucketStore`] trait from `webotron-core` to Amazon S3
//! (or an S3-compatible endpoint) through `aws-sdk-s3`.
//!
//! - Construct [`S3Store`] from an [`AppConfig`]; credentials come from the AWS
//!   default chain, honoring the configured profile.
//! - Service errors are mapped onto [`StoreError`]; the create-bucket codes
//!   `BucketAlreadyOwnedByYou` and `BucketAlreadyExists` get their own variants.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTimeFormat};
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, ErrorDocument, IndexDocument,
    WebsiteConfiguration,
};
use aws_sdk_s3::Client;
use webotron_core::contract::{
    Bucket, BucketStore, BucketSummary, ObjectSummary, UploadRequest, WebsiteConfig,
};
use webotron_core::error::StoreError;

use crate::load_config::AppConfig;

/// Region in which S3 rejects an explicit location constraint.
const DEFAULT_REGION: &str = "us-east-1";

pub struct S3Store {
    client: Client,
    region: Option<String>,
}

impl S3Store {
    /// Build a client from the AWS default configuration chain plus any overrides in `config`.
    pub async fn from_config(config: &AppConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();
        let region = sdk_config.region().map(|r| r.to_string());

        tracing::info!(
            profile = ?config.profile,
            region = ?region,
            endpoint_url = ?config.endpoint_url,
            "Initialized S3 client"
        );

        S3Store {
            client: Client::from_conf(s3_config),
            region,
        }
    }

    fn location_constraint(&self) -> Option<CreateBucketConfiguration> {
        self.region
            .as_deref()
            .filter(|region| *region != DEFAULT_REGION)
            .map(|region| {
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build()
            })
    }
}

fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    StoreError::service(operation, DisplayErrorContext(&err))
}

#[async_trait]
impl BucketStore for S3Store {
    async fn create_bucket(&self, name: &str) -> Result<Bucket, StoreError> {
        tracing::info!(bucket = name, region = ?self.region, "Creating bucket");
        let mut req = self.client.create_bucket().bucket(name);
        if let Some(configuration) = self.location_constraint() {
            req = req.create_bucket_configuration(configuration);
        }

        match req.send().await {
            Ok(_) => {
                tracing::info!(bucket = name, "Successfully created bucket");
                Ok(Bucket::new(name))
            }
            Err(SdkError::ServiceError(context)) => {
                let err = context.into_err();
                if err.is_bucket_already_owned_by_you() {
                    Err(StoreError::BucketAlreadyOwnedByYou {
                        bucket: name.to_string(),
                    })
                } else if err.is_bucket_already_exists() {
                    Err(StoreError::BucketAlreadyExists {
                        bucket: name.to_string(),
                    })
                } else {
                    tracing::error!(bucket = name, error = %DisplayErrorContext(&err), "API error creating bucket");
                    Err(StoreError::service("CreateBucket", DisplayErrorContext(&err)))
                }
            }
            Err(e) => {
                tracing::error!(bucket = name, error = %DisplayErrorContext(&e), "Failed to create bucket");
                Err(sdk_error("CreateBucket", e))
            }
        }
    }

    async fn put_bucket_policy(&self, bucket: &Bucket, policy: &str) -> Result<(), StoreError> {
        tracing::info!(bucket = %bucket.name, "Putting bucket policy");
        self.client
            .put_bucket_policy()
            .bucket(&bucket.name)
            .policy(policy)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(bucket = %bucket.name, error = %DisplayErrorContext(&e), "Failed to put bucket policy");
                sdk_error("PutBucketPolicy", e)
            })?;
        Ok(())
    }

    async fn put_bucket_website(
        &self,
        bucket: &Bucket,
        website: &WebsiteConfig,
    ) -> Result<(), StoreError> {
        tracing::info!(
            bucket = %bucket.name,
            index = %website.index_document,
            error_document = %website.error_document,
            "Putting bucket website configuration"
        );
        let index = IndexDocument::builder()
            .suffix(&website.index_document)
            .build()
            .map_err(|e| StoreError::service("PutBucketWebsite", e))?;
        let error = ErrorDocument::builder()
            .key(&website.error_document)
            .build()
            .map_err(|e| StoreError::service("PutBucketWebsite", e))?;
        let configuration = WebsiteConfiguration::builder()
            .index_document(index)
            .error_document(error)
            .build();

        self.client
            .put_bucket_website()
            .bucket(&bucket.name)
            .website_configuration(configuration)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(bucket = %bucket.name, error = %DisplayErrorContext(&e), "Failed to put bucket website configuration");
                sdk_error("PutBucketWebsite", e)
            })?;
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StoreError> {
        tracing::info!("Listing buckets");
        let output = self.client.list_buckets().send().await.map_err(|e| {
            tracing::error!(error = %DisplayErrorContext(&e), "Failed to list buckets");
            sdk_error("ListBuckets", e)
        })?;

        let buckets: Vec<BucketSummary> = output
            .buckets()
            .iter()
            .filter_map(|b| {
                b.name().map(|name| BucketSummary {
                    name: name.to_string(),
                    created: b
                        .creation_date()
                        .and_then(|d| d.fmt(DateTimeFormat::DateTime).ok()),
                })
            })
            .collect();
        tracing::info!(count = buckets.len(), "Fetched bucket list");
        Ok(buckets)
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        tracing::info!(bucket, "Listing bucket objects");
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                tracing::error!(bucket, error = %DisplayErrorContext(&e), "Failed to list objects");
                sdk_error("ListObjectsV2", e)
            })?;
            objects.extend(page.contents().iter().filter_map(|o| {
                o.key().map(|key| ObjectSummary {
                    key: key.to_string(),
                    size: o.size().unwrap_or_default(),
                    last_modified: o
                        .last_modified()
                        .and_then(|d| d.fmt(DateTimeFormat::DateTime).ok()),
                })
            }));
        }
        tracing::info!(bucket, count = objects.len(), "Fetched object list");
        Ok(objects)
    }

    async fn upload_file(&self, req: UploadRequest) -> Result<(), StoreError> {
        tracing::debug!(
            bucket = %req.bucket,
            key = %req.key,
            content_type = %req.content_type,
            path = %req.path.display(),
            "Uploading object"
        );
        let body = ByteStream::from_path(&req.path)
            .await
            .map_err(|e| StoreError::Io {
                path: req.path.clone(),
                source: std::io::Error::other(e),
            })?;

        self.client
            .put_object()
            .bucket(&req.bucket)
            .key(&req.key)
            .content_type(&req.content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key = %req.key, error = %DisplayErrorContext(&e), "API error uploading object");
                sdk_error("PutObject", e)
            })?;
        tracing::info!(bucket = %req.bucket, key = %req.key, "Uploaded object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_in(region: &str) -> S3Store {
        let config = AppConfig {
            region: Some(region.to_string()),
            endpoint_url: Some("http://localhost:9000".to_string()),
            force_path_style: true,
            ..AppConfig::default()
        };
        S3Store::from_config(&config).await
    }

    #[tokio::test]
    async fn no_location_constraint_in_default_region() {
        let store = store_in("us-east-1").await;
        assert!(store.location_constraint().is_none());
    }

    #[tokio::test]
    async fn location_constraint_names_the_region() {
        let store = store_in("eu-west-1").await;
        let configuration = store.location_constraint().expect("constraint expected");
        assert_eq!(
            configuration.location_constraint(),
            Some(&BucketLocationConstraint::EuWest1)
        );
    }
}
