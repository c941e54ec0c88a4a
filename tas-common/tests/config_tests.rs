//! Unit tests for configuration resolution and graceful degradation
//!
//! Tests the implementation of:
//! - Priority order CLI > ENV > TOML > compiled defaults
//! - Missing implicit TOML files SHALL NOT cause termination
//! - Explicitly named config files must exist
//! - Invalid environment values are configuration errors
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Every test here touches TAS_* variables and is marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tas_common::config::{
    ConfigOverrides, ConfigResolver, ContentTypeMatching, LogFormat, ServiceConfig,
    CONFIG_FILE_ENV, DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT,
};
use tas_common::Error;
use tempfile::NamedTempFile;

const TAS_VARS: &[&str] = &[
    "TAS_CONFIG",
    "TAS_HOST",
    "TAS_PORT",
    "TAS_KEYWORD_STOP_LIST",
    "TAS_CONTENT_TYPE_MATCHING",
    "TAS_MAX_BODY_SIZE",
    "TAS_ANALYSIS_TIMEOUT_MS",
    "TAS_LOG_LEVEL",
];

fn clear_env() {
    for var in TAS_VARS {
        env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Should create temp file");
    file.write_all(contents.as_bytes())
        .expect("Should write temp config");
    file
}

fn overrides_with_file(path: PathBuf) -> ConfigOverrides {
    ConfigOverrides {
        config_file: Some(path),
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_explicit_file_values_override_defaults() {
    clear_env();
    let file = write_config(
        r#"
        host = "0.0.0.0"
        port = 9100
        keyword_stop_list = "FoxStoplist.txt"
        content_type_matching = "prefix"
        max_body_size = 250000
        analysis_timeout_ms = 5000
        summary_sentences = 2
        metrics_prefix = "tas.test"

        [logging]
        level = "debug"
        format = "json"
        "#,
    );

    let config = ConfigResolver::new(overrides_with_file(file.path().to_path_buf()))
        .resolve()
        .expect("Should resolve");

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 9100);
    assert_eq!(config.keyword_stop_list, "FoxStoplist.txt");
    assert_eq!(config.content_type_matching, ContentTypeMatching::Prefix);
    assert_eq!(config.max_body_size, Some(250_000));
    assert_eq!(config.analysis_timeout, Duration::from_millis(5000));
    assert_eq!(config.summary_sentences, 2);
    assert_eq!(config.metrics_prefix, "tas.test");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.config_file.as_deref(), Some(file.path()));
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    let file = write_config("port = 9100\nhost = \"10.0.0.1\"\n");
    env::set_var("TAS_PORT", "9200");

    let config = ConfigResolver::new(overrides_with_file(file.path().to_path_buf()))
        .resolve()
        .expect("Should resolve");

    assert_eq!(config.port, 9200, "ENV should beat TOML");
    assert_eq!(config.host, "10.0.0.1", "TOML should still apply to other keys");

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("TAS_PORT", "9200");
    env::set_var("TAS_CONTENT_TYPE_MATCHING", "prefix");

    let overrides = ConfigOverrides {
        port: Some(9300),
        content_type_matching: Some(ContentTypeMatching::Exact),
        ..Default::default()
    };
    let config = ConfigResolver::new(overrides).resolve().expect("Should resolve");

    assert_eq!(config.port, 9300);
    assert_eq!(config.content_type_matching, ContentTypeMatching::Exact);

    clear_env();
}

#[test]
#[serial]
fn test_config_file_from_env_variable() {
    clear_env();
    let file = write_config("port = 9400\n");
    env::set_var(CONFIG_FILE_ENV, file.path());

    let config = ConfigResolver::new(ConfigOverrides::default())
        .resolve()
        .expect("Should resolve");

    assert_eq!(config.port, 9400);

    clear_env();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env();
    let result = ConfigResolver::new(overrides_with_file(PathBuf::from(
        "/nonexistent/tas/config.toml",
    )))
    .resolve();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_malformed_toml_is_error() {
    clear_env();
    let file = write_config("port = \"not a number\"\n");

    let result = ConfigResolver::new(overrides_with_file(file.path().to_path_buf())).resolve();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_invalid_env_value_is_error() {
    clear_env();
    env::set_var("TAS_PORT", "eighty");

    let result = ConfigResolver::new(ConfigOverrides::default()).resolve();
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_zero_body_size_disables_check() {
    clear_env();
    let file = write_config("max_body_size = 0\n");

    let config = ConfigResolver::new(overrides_with_file(file.path().to_path_buf()))
        .resolve()
        .expect("Should resolve");

    assert_eq!(config.max_body_size, None);
}

#[test]
#[serial]
fn test_zero_timeout_rejected() {
    clear_env();
    let overrides = ConfigOverrides {
        analysis_timeout_ms: Some(0),
        ..Default::default()
    };

    let result = ConfigResolver::new(overrides).resolve();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_empty_file_yields_defaults() {
    clear_env();
    let file = write_config("");

    let config = ConfigResolver::new(overrides_with_file(file.path().to_path_buf()))
        .resolve()
        .expect("Should resolve");

    let defaults = ServiceConfig::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.host, defaults.host);
    assert_eq!(config.keyword_stop_list, defaults.keyword_stop_list);
    assert_eq!(config.logging, defaults.logging);
    assert_eq!(config.max_body_size, Some(DEFAULT_MAX_BODY_SIZE));
}

#[test]
#[serial]
fn test_body_size_limit_on_by_default() {
    clear_env();
    let file = write_config("port = 8021\n");

    let config = ConfigResolver::new(overrides_with_file(file.path().to_path_buf()))
        .resolve()
        .expect("Should resolve");
    assert_eq!(config.max_body_size, Some(DEFAULT_MAX_BODY_SIZE));

    env::set_var("TAS_MAX_BODY_SIZE", "0");
    let config = ConfigResolver::new(overrides_with_file(file.path().to_path_buf()))
        .resolve()
        .expect("Should resolve");
    assert_eq!(config.max_body_size, None);

    clear_env();
}
