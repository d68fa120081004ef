//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use recordfetch_domain::{HttpMethod, IdPlacement, PayloadShape, RecordFetchError};
use recordfetch_infra::{config, endpoints_for};
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let path = write_config(
        r#"{
        "backend": { "base_url": "https://backend.example.com/api/v1" },
        "timeouts": { "connect_secs": 5, "read_secs": 15, "total_secs": 20 },
        "retry": { "max_attempts": 2, "initial_delay_ms": 250 },
        "logging": { "level": "debug", "json": true }
    }"#,
        "json",
    );

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = result.expect("Failed to load config from JSON file");
    assert_eq!(config.backend.base_url, "https://backend.example.com/api/v1");
    assert_eq!(config.timeouts.connect_secs, 5);
    assert_eq!(config.timeouts.total_secs, 20);
    assert_eq!(config.retry.max_attempts, 2);
    assert_eq!(config.retry.initial_delay_ms, 250);
    assert_eq!(config.circuit_breaker.failure_threshold, 5);
    assert!(config.logging.json);

    // No endpoints configured: the built-in catalog applies
    assert_eq!(endpoints_for(&config).len(), 6);
}

#[test]
fn test_load_config_with_custom_endpoints_from_toml_file() {
    let path = write_config(
        r#"
[backend]
base_url = "https://backend.example.com"

[[endpoints]]
name = "allergies"
path = "/allergies"
id_key = "PatNum"
shape = "array"
placement = { kind = "query", param = "PatNum" }

[[endpoints]]
name = "patientnotes"
path = "/patientnotes"
id_key = "PatNum"
shape = "object"
placement = { kind = "path_segment" }

[[endpoints]]
name = "vital_signs"
method = "PUT"
path = "/queries/ShortQuery"
id_key = "PatNum"
placement = { kind = "json_body", field = "SqlCommand", template = "SELECT * FROM vitalsign WHERE PatNum = {id}" }
"#,
        "toml",
    );

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = result.expect("Failed to load config from TOML file");
    let endpoints = endpoints_for(&config);
    assert_eq!(endpoints.len(), 3);

    assert_eq!(endpoints[0].placement, IdPlacement::Query { param: "PatNum".into() });
    assert_eq!(endpoints[0].shape, PayloadShape::Array);
    assert_eq!(endpoints[1].placement, IdPlacement::PathSegment);
    assert_eq!(endpoints[2].method, HttpMethod::Put);
    assert_eq!(endpoints[2].shape, PayloadShape::Any);
}

#[test]
fn test_duplicate_endpoint_names_are_rejected() {
    let path = write_config(
        r#"
[backend]
base_url = "https://backend.example.com"

[[endpoints]]
name = "allergies"
path = "/allergies"
id_key = "PatNum"
placement = { kind = "path_segment" }

[[endpoints]]
name = "allergies"
path = "/allergies/v2"
id_key = "PatNum"
placement = { kind = "path_segment" }
"#,
        "toml",
    );

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    match result {
        Err(RecordFetchError::Config(msg)) => assert!(msg.contains("allergies")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_missing_backend_section_fails() {
    let path = write_config(r#"{ "retry": { "max_attempts": 3 } }"#, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    assert!(matches!(result, Err(RecordFetchError::Config(_))));
}
