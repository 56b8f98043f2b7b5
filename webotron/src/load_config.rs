//! `load_config` module: Loads the optional YAML configuration file and merges
//! environment overrides into an [`AppConfig`].
//!
//! # Responsibilities
//! - Parse the user-supplied YAML file into type-safe structs
//! - Apply `WEBOTRON_*` environment overrides on top of the file
//! - Fill in website defaults (`index.html` / `error.html`) for anything left out
//!
//! Credentials never live here: they are resolved by the AWS default chain,
//! using `profile` when one is selected.
//!
//! # Errors
//! All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
//!
//! Example file:
//!
//! ```yaml
//! profile: website-deploy
//! region: eu-west-1
//! website:
//!   index_document: index.html
//!   error_document: 404.html
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};
use webotron_core::contract::WebsiteConfig;

pub const ENV_PROFILE: &str = "WEBOTRON_PROFILE";
pub const ENV_REGION: &str = "WEBOTRON_REGION";
pub const ENV_ENDPOINT_URL: &str = "WEBOTRON_ENDPOINT_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Named profile from the shared AWS config/credentials files.
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Address buckets as `endpoint/bucket` rather than `bucket.endpoint`.
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default)]
    pub website: WebsiteSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebsiteSection {
    #[serde(default = "default_index_document")]
    pub index_document: String,
    #[serde(default = "default_error_document")]
    pub error_document: String,
}

fn default_index_document() -> String {
    WebsiteConfig::default().index_document
}

fn default_error_document() -> String {
    WebsiteConfig::default().error_document
}

impl Default for WebsiteSection {
    fn default() -> Self {
        Self {
            index_document: default_index_document(),
            error_document: default_error_document(),
        }
    }
}

impl From<&WebsiteSection> for WebsiteConfig {
    fn from(section: &WebsiteSection) -> Self {
        WebsiteConfig {
            index_document: section.index_document.clone(),
            error_document: section.error_document.clone(),
        }
    }
}

impl AppConfig {
    /// Override file values with any `WEBOTRON_*` variables present in the environment.
    pub fn apply_env(mut self) -> Self {
        if let Ok(profile) = std::env::var(ENV_PROFILE) {
            info!(profile = %profile, "Profile overridden from environment");
            self.profile = Some(profile);
        }
        if let Ok(region) = std::env::var(ENV_REGION) {
            info!(region = %region, "Region overridden from environment");
            self.region = Some(region);
        }
        if let Ok(endpoint_url) = std::env::var(ENV_ENDPOINT_URL) {
            info!(endpoint_url = %endpoint_url, "Endpoint overridden from environment");
            self.endpoint_url = Some(endpoint_url);
        }
        self
    }

    pub fn website(&self) -> WebsiteConfig {
        WebsiteConfig::from(&self.website)
    }
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid config with every default.
    if config_content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    match serde_yaml::from_str::<AppConfig>(&config_content) {
        Ok(conf) => {
            info!(
                config_path = ?path_ref,
                profile = ?conf.profile,
                region = ?conf.region,
                "Parsed config YAML successfully"
            );
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Load the file when one is given, then layer environment overrides on top.
pub fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    Ok(config.apply_env())
}
