// rest_api/src/config.rs

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::info;

/// Default port the prediction API listens on.
pub const DEFAULT_REST_API_PORT: u16 = 8000;
/// Default bind address.
pub const DEFAULT_REST_API_HOST: &str = "0.0.0.0";
/// Default directory holding the trained model artifacts.
pub const DEFAULT_MODEL_DIRECTORY: &str = "model_artifacts";
/// Config file consulted when no explicit path is given.
pub const DEFAULT_REST_API_CONFIG_PATH: &str = "rest_api_config.yaml";

/// Configuration for the REST API server, mirroring the content under the
/// `rest_api:` key in `rest_api_config.yaml`. Every field has a default so a
/// partial file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestApiConfig {
    #[serde(default = "default_rest_api_host")]
    pub host: String,
    #[serde(default = "default_rest_api_port")]
    pub port: u16,
    #[serde(default = "default_model_directory")]
    pub model_directory: PathBuf,
}

fn default_rest_api_host() -> String {
    DEFAULT_REST_API_HOST.to_string()
}

fn default_rest_api_port() -> u16 {
    DEFAULT_REST_API_PORT
}

fn default_model_directory() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_DIRECTORY)
}

impl Default for RestApiConfig {
    fn default() -> Self {
        RestApiConfig {
            host: default_rest_api_host(),
            port: default_rest_api_port(),
            model_directory: default_model_directory(),
        }
    }
}

// Wrapper struct to match the 'rest_api:' key in the YAML config.
#[derive(Debug, Deserialize)]
struct RestApiConfigWrapper {
    rest_api: RestApiConfig,
}

/// Loads the REST API configuration.
///
/// An explicit `path` must exist and parse. Without one, the default file is
/// used when present and built-in defaults otherwise, so the server starts on
/// a fresh checkout.
pub fn load_rest_api_config(path: Option<&Path>) -> Result<RestApiConfig> {
    let (config_path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_REST_API_CONFIG_PATH), false),
    };

    if !config_path.exists() {
        if explicit {
            return Err(anyhow::anyhow!(
                "Config file not found: {}",
                config_path.display()
            ));
        }
        info!(
            "No config file at {}; using built-in defaults",
            config_path.display()
        );
        return Ok(RestApiConfig::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config file: {}", config_path.display()))?;

    let wrapper: RestApiConfigWrapper = serde_yaml2::from_str(&config_content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", config_path.display(), e))?;

    Ok(wrapper.rest_api)
}

#[cfg(test)]
mod tests {
    use super::{
        load_rest_api_config, RestApiConfig, DEFAULT_MODEL_DIRECTORY, DEFAULT_REST_API_HOST,
    };
    use std::fs;
    use std::path::{Path, PathBuf};

    #[test]
    fn defaults_cover_every_field() {
        let config = RestApiConfig::default();
        assert_eq!(config.host, DEFAULT_REST_API_HOST);
        assert_eq!(config.port, 8000);
        assert_eq!(config.model_directory, PathBuf::from(DEFAULT_MODEL_DIRECTORY));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_rest_api_config(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn parses_a_full_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rest_api_config.yaml");
        fs::write(
            &path,
            "rest_api:\n  host: \"127.0.0.1\"\n  port: 9001\n  model_directory: \"/tmp/artifacts\"\n",
        )
        .unwrap();

        let config = load_rest_api_config(Some(&path)).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9001);
        assert_eq!(config.model_directory, PathBuf::from("/tmp/artifacts"));
    }

    #[test]
    fn partial_file_fills_in_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rest_api_config.yaml");
        fs::write(&path, "rest_api:\n  port: 9100\n").unwrap();

        let config = load_rest_api_config(Some(&path)).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, DEFAULT_REST_API_HOST);
        assert_eq!(config.model_directory, PathBuf::from(DEFAULT_MODEL_DIRECTORY));
    }

    #[test]
    fn garbage_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rest_api_config.yaml");
        fs::write(&path, ": not yaml : [").unwrap();
        assert!(load_rest_api_config(Some(&path)).is_err());
    }
}
