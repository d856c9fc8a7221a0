//! Client configuration
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional `sbdev-admin.toml` (or an explicit file), then `SBDEV_*`
//! environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::error::{ConfigError, ConfigResult};

/// Default base URL of the site API
pub const DEFAULT_API_BASE: &str = "https://api.sbdevstudio.in/api";

/// Base name of the optional configuration file in the working directory
pub const CONFIG_FILE_NAME: &str = "sbdev-admin";

/// Prefix of environment overrides (e.g. `SBDEV_API_BASE`)
pub const ENV_PREFIX: &str = "SBDEV";

/// Client configuration struct
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every API path is appended to
    pub api_base: String,
    /// Directory holding durable client storage
    pub storage_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    api_base: String,
    storage_dir: Option<PathBuf>,
}

fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("sbdev-admin"))
        .unwrap_or_else(|| PathBuf::from(".sbdev-admin"))
}

impl ClientConfig {
    /// Load configuration from `sbdev-admin.toml` (if present) and the
    /// environment
    ///
    /// # Environment Variables
    /// - `SBDEV_API_BASE`: API base URL (default: "https://api.sbdevstudio.in/api")
    /// - `SBDEV_STORAGE_DIR`: storage directory (default: platform local data dir)
    pub fn from_env() -> ConfigResult<Self> {
        Self::load(None)
    }

    /// Load configuration, reading `file` instead of the default file name
    /// when given. An explicit file must exist.
    pub fn load(file: Option<&Path>) -> ConfigResult<Self> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE_NAME).required(false),
        };

        let raw: RawConfig = Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        let api_base = raw.api_base.trim().trim_end_matches('/').to_string();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "api_base",
                message: format!("expected an http(s) URL, got {:?}", raw.api_base),
            });
        }

        let config = ClientConfig {
            api_base,
            storage_dir: raw.storage_dir.unwrap_or_else(default_storage_dir),
        };
        info!("Client configured for API at {}", config.api_base);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        // SAFETY: tests touching the environment run serially.
        unsafe {
            std::env::remove_var("SBDEV_API_BASE");
            std::env::remove_var("SBDEV_STORAGE_DIR");
        }
    }

    #[test]
    #[serial]
    fn test_client_config_defaults() {
        clear_env();
        let config = ClientConfig::from_env().expect("Failed to create client config");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.storage_dir.ends_with("sbdev-admin") || config.storage_dir.ends_with(".sbdev-admin"));
    }

    #[test]
    #[serial]
    fn test_client_config_env_overrides() {
        clear_env();
        // SAFETY: tests touching the environment run serially.
        unsafe {
            std::env::set_var("SBDEV_API_BASE", "http://localhost:8001/api/");
            std::env::set_var("SBDEV_STORAGE_DIR", "/tmp/sbdev-test");
        }

        let config = ClientConfig::from_env().expect("Failed to create client config");
        clear_env();

        assert_eq!(config.api_base, "http://localhost:8001/api");
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/sbdev-test"));
    }

    #[test]
    #[serial]
    fn test_client_config_from_file() {
        clear_env();
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        writeln!(file, "api_base = \"http://127.0.0.1:9000/api\"").expect("write");

        let config = ClientConfig::load(Some(file.path())).expect("Failed to load config file");
        assert_eq!(config.api_base, "http://127.0.0.1:9000/api");
    }

    #[test]
    #[serial]
    fn test_client_config_rejects_non_http_base() {
        clear_env();
        // SAFETY: tests touching the environment run serially.
        unsafe {
            std::env::set_var("SBDEV_API_BASE", "ftp://example.com");
        }

        let result = ClientConfig::from_env();
        clear_env();

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "api_base", .. })
        ));
    }
}
