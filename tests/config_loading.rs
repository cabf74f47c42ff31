use std::io::Write;

use flowdeck_core::config::AppConfig;

#[test]
fn test_load_full_config_from_file() {
    let toml_content = r#"
[backend]
base_url = "http://10.0.0.5:9000"
timeout_secs = 5

[canvas]
zoom = 1.5
zoom_min = 0.5
zoom_max = 3.0
zoom_step = 0.5
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.backend.base_url, "http://10.0.0.5:9000");
    assert_eq!(config.backend.timeout_secs, 5);
    assert_eq!(config.canvas.zoom, 1.5);
    assert_eq!(config.canvas.zoom_min, 0.5);
    assert_eq!(config.canvas.zoom_max, 3.0);
    assert_eq!(config.canvas.zoom_step, 0.5);
}

#[test]
fn test_env_var_expansion_in_config() {
    std::env::set_var("FLOWDECK_TEST_BACKEND", "http://expanded:8000");

    let toml_content = r#"
[backend]
base_url = "${FLOWDECK_TEST_BACKEND}"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.backend.base_url, "http://expanded:8000");

    std::env::remove_var("FLOWDECK_TEST_BACKEND");
}

#[test]
fn test_minimal_config_uses_defaults() {
    let toml_content = r#"
[backend]
base_url = "http://localhost:8000"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.backend.timeout_secs, 30);
    assert_eq!(config.canvas.zoom, 1.0);
    assert_eq!(config.canvas.zoom_min, 0.25);
    assert_eq!(config.canvas.zoom_max, 4.0);
}

#[test]
fn test_empty_config_is_all_defaults() {
    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"").expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
}

#[test]
fn test_missing_file_is_config_not_found() {
    let err = AppConfig::load(std::path::Path::new("/nonexistent/flowdeck.toml")).unwrap_err();
    assert!(matches!(
        err,
        flowdeck_core::error::FlowdeckError::ConfigNotFound(_)
    ));
}
