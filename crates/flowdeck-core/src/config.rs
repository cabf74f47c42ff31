use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlowdeckError, Result};

/// Top-level Flowdeck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
}

/// Remote execution backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the workflow backend (no trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Canvas viewport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_zoom_min")]
    pub zoom_min: f64,
    #[serde(default = "default_zoom_max")]
    pub zoom_max: f64,
    /// Zoom increment applied per zoom-in/out action.
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            zoom_min: default_zoom_min(),
            zoom_max: default_zoom_max(),
            zoom_step: default_zoom_step(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_zoom() -> f64 {
    1.0
}

fn default_zoom_min() -> f64 {
    0.25
}

fn default_zoom_max() -> f64 {
    4.0
}

fn default_zoom_step() -> f64 {
    0.25
}

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| FlowdeckError::ConfigNotFound(path.display().to_string()))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| FlowdeckError::Config(e.to_string()))
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Keep original if env var not set
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TEST_FLOWDECK_VAR", "hello");
        let result = expand_env_vars("key = \"${TEST_FLOWDECK_VAR}\"");
        assert_eq!(result, "key = \"hello\"");
        std::env::remove_var("TEST_FLOWDECK_VAR");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("key = \"${NONEXISTENT_FLOWDECK_VAR}\"");
        assert_eq!(result, "key = \"${NONEXISTENT_FLOWDECK_VAR}\"");
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.canvas.zoom, 1.0);
        assert!(config.canvas.zoom_min < config.canvas.zoom_max);
    }
}
