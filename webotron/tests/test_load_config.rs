use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;
use webotron::load_config::{
    load_config, resolve_config, AppConfig, ENV_ENDPOINT_URL, ENV_PROFILE, ENV_REGION,
};
use webotron_core::contract::WebsiteConfig;

fn clear_env() {
    env::remove_var(ENV_PROFILE);
    env::remove_var(ENV_REGION);
    env::remove_var(ENV_ENDPOINT_URL);
}

/// A full config file populates every field.
#[test]
#[serial]
fn test_load_config_full_file() {
    let config_yaml = r#"
profile: website-deploy
region: eu-west-1
endpoint_url: "http://localhost:9000"
force_path_style: true
website:
  index_document: home.html
  error_document: 404.html
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.profile.as_deref(), Some("website-deploy"));
    assert_eq!(config.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
    assert!(config.force_path_style);
    assert_eq!(
        config.website(),
        WebsiteConfig {
            index_document: "home.html".into(),
            error_document: "404.html".into(),
        }
    );
}

/// Omitted keys fall back to defaults, including the website documents.
#[test]
#[serial]
fn test_load_config_partial_file_uses_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "region: us-east-2\n").unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    assert_eq!(config.region.as_deref(), Some("us-east-2"));
    assert_eq!(config.profile, None);
    assert!(!config.force_path_style);
    assert_eq!(config.website(), WebsiteConfig::default());
}

#[test]
#[serial]
fn test_load_config_empty_file_is_default() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "").unwrap();

    let config = load_config(config_file.path()).expect("Empty config should load");
    assert_eq!(config, AppConfig::default());
}

/// If the config file is not valid YAML, load_config errors and reports as such.
#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn test_load_config_rejects_unknown_keys() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "bucket_region: eu-west-1\n").unwrap();

    assert!(load_config(config_file.path()).is_err());
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

/// Environment variables override values from the file.
#[test]
#[serial]
fn test_resolve_config_applies_env_overrides() {
    clear_env();
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "profile: from-file\nregion: eu-west-1\n").unwrap();

    env::set_var(ENV_PROFILE, "from-env");
    env::set_var(ENV_ENDPOINT_URL, "http://minio:9000");

    let config = resolve_config(Some(config_file.path())).expect("Config should resolve");
    clear_env();

    assert_eq!(config.profile.as_deref(), Some("from-env"));
    assert_eq!(config.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.endpoint_url.as_deref(), Some("http://minio:9000"));
}

#[test]
#[serial]
fn test_resolve_config_without_file_is_default() {
    clear_env();
    let config = resolve_config(None).expect("Default config should resolve");
    assert_eq!(config, AppConfig::default());
}
