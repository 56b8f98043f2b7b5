//! This module implements the CLI interface for webotron: command parsing,
//! config resolution, and the async entrypoint used by `main` and by tests.
//!
//! All bucket setup and sync logic lives in the [`webotron-core`] crate.
//! This module is strictly CLI glue: it builds an [`S3Store`], hands it to the
//! core operations and prints their results.
//!
//! ## How To Use
//! - For command-line users: run `webotron --help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`webotron-core`]: ../../webotron-core/

use crate::load_config::{resolve_config, AppConfig};
use crate::s3::S3Store;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use webotron_core::bucket::setup_bucket;
use webotron_core::contract::BucketStore;
use webotron_core::synchronise::sync_directory;
use webotron_core::walk::resolve_root;

/// CLI for webotron: deploy static websites to S3.
#[derive(Parser, Debug)]
#[clap(
    name = "webotron",
    version,
    about = "Webotron deploys websites to AWS S3"
)]
pub struct Cli {
    /// Path to an optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// AWS profile to use (overrides the config file)
    #[clap(long, global = true)]
    pub profile: Option<String>,

    /// AWS region to use (overrides the config file)
    #[clap(long, global = true)]
    pub region: Option<String>,

    /// Custom S3 endpoint, e.g. for S3-compatible services
    #[clap(long, global = true)]
    pub endpoint_url: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all S3 buckets
    ListBuckets,
    /// List objects in a bucket
    ListBucketObjects {
        /// Bucket to list
        bucket: String,
    },
    /// Create and configure an S3 bucket for website hosting
    SetupBucket {
        /// Bucket to create or reconfigure
        bucket: String,
    },
    /// Sync contents of PATHNAME to BUCKET
    Sync {
        /// Local directory holding the site
        pathname: PathBuf,
        /// Target bucket
        bucket: String,
    },
}

impl Cli {
    /// Resolve the effective config: file, then environment, then command-line flags.
    pub fn app_config(&self) -> Result<AppConfig> {
        let mut config = resolve_config(self.config.as_deref())?;
        if let Some(profile) = &self.profile {
            config.profile = Some(profile.clone());
        }
        if let Some(region) = &self.region {
            config.region = Some(region.clone());
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            config.endpoint_url = Some(endpoint_url.clone());
        }
        Ok(config)
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = cli.app_config()?;

    match cli.command {
        Commands::ListBuckets => {
            let store = S3Store::from_config(&config).await;
            list_buckets(&store).await
        }
        Commands::ListBucketObjects { bucket } => {
            let store = S3Store::from_config(&config).await;
            list_bucket_objects(&store, &bucket).await
        }
        Commands::SetupBucket { bucket } => {
            tracing::info!(command = "setup-bucket", bucket = %bucket, "Setting up bucket");
            let store = S3Store::from_config(&config).await;
            let setup = setup_bucket(&store, &bucket, &config.website())
                .await
                .with_context(|| format!("Failed to set up bucket {bucket}"))?;
            tracing::info!(
                command = "setup-bucket",
                bucket = %setup.bucket.name,
                newly_created = setup.newly_created,
                "Bucket setup complete"
            );
            println!("Bucket {} is ready for website hosting", setup.bucket.name);
            Ok(())
        }
        Commands::Sync { pathname, bucket } => {
            // Reject a bad path before any client is built.
            resolve_root(&pathname)
                .with_context(|| format!("Cannot sync {}", pathname.display()))?;
            tracing::info!(command = "sync", path = %pathname.display(), bucket = %bucket, "Starting synchronisation process");
            let store = S3Store::from_config(&config).await;
            match sync_directory(&store, &pathname, &bucket).await {
                Ok(report) => {
                    tracing::info!(
                        command = "sync",
                        objects = report.uploaded.len(),
                        "Synchronisation complete"
                    );
                    println!(
                        "Synced {} files from {} to {}",
                        report.uploaded.len(),
                        report.root.display(),
                        report.bucket
                    );
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}

async fn list_buckets<S: BucketStore>(store: &S) -> Result<()> {
    let buckets = store
        .list_buckets()
        .await
        .context("Failed to list buckets")?;
    for bucket in buckets {
        match bucket.created {
            Some(created) => println!("{}\t{}", bucket.name, created),
            None => println!("{}", bucket.name),
        }
    }
    Ok(())
}

async fn list_bucket_objects<S: BucketStore>(store: &S, bucket: &str) -> Result<()> {
    let objects = store
        .list_objects(bucket)
        .await
        .with_context(|| format!("Failed to list objects in {bucket}"))?;
    for object in objects {
        println!("{}\t{}", object.key, object.size);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sync_with_positional_arguments() {
        let cli = Cli::try_parse_from(["webotron", "sync", "./kitten_web", "kitten-web"]).unwrap();
        match cli.command {
            Commands::Sync { pathname, bucket } => {
                assert_eq!(pathname, PathBuf::from("./kitten_web"));
                assert_eq!(bucket, "kitten-web");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "webotron",
            "setup-bucket",
            "kitten-web",
            "--region",
            "eu-west-1",
        ])
        .unwrap();
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn flags_override_resolved_config() {
        let cli = Cli::try_parse_from([
            "webotron",
            "--profile",
            "deploy",
            "--region",
            "ap-south-1",
            "--endpoint-url",
            "http://localhost:9000",
            "list-buckets",
        ])
        .unwrap();
        let config = cli.app_config().unwrap();
        assert_eq!(config.profile.as_deref(), Some("deploy"));
        assert_eq!(config.region.as_deref(), Some("ap-south-1"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn list_bucket_objects_requires_a_bucket() {
        assert!(Cli::try_parse_from(["webotron", "list-bucket-objects"]).is_err());
    }
}
