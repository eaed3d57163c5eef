use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Upload size limit: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "data/documents.db".to_string()
}

fn default_upload_dir() -> String {
    "data/uploads".to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        tracing::info!(
            "Storage config: upload_dir={}, max_upload_bytes={}",
            config.storage.upload_dir,
            config.storage.max_upload_bytes
        );
        Ok(config)
    }

    /// Load configuration from config.toml or conf.ini
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["config.toml", "conf.ini", "data/config.toml", "data/conf.ini"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config = Self::from_toml(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides
    /// Format: DP_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(val) = lookup("DP_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        // PORT is kept for compatibility with plain PaaS-style deployments
        for key in ["DP_CONF_SERVER_PORT", "PORT"] {
            if let Some(val) = lookup(key) {
                match val.parse() {
                    Ok(port) => {
                        self.server.port = port;
                        break;
                    }
                    Err(_) => tracing::warn!("Ignoring invalid {}={}", key, val),
                }
            }
        }

        // Database overrides
        if let Some(val) = lookup("DP_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Storage overrides
        if let Some(val) = lookup("DP_CONF_STORAGE_UPLOAD_DIR") {
            self.storage.upload_dir = val;
        }
        if let Some(val) = lookup("DP_CONF_STORAGE_MAX_UPLOAD_BYTES") {
            match val.parse() {
                Ok(bytes) => self.storage.max_upload_bytes = bytes,
                Err(_) => tracing::warn!("Ignoring invalid DP_CONF_STORAGE_MAX_UPLOAD_BYTES={}", val),
            }
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)?;
        }

        fs::create_dir_all(&self.storage.upload_dir)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage.upload_dir, "data/uploads");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.path, "data/documents.db");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("DP_CONF_SERVER_PORT", "9000"),
            ("PORT", "7000"),
            ("DP_CONF_STORAGE_UPLOAD_DIR", "/srv/uploads"),
            ("DP_CONF_STORAGE_MAX_UPLOAD_BYTES", "2048"),
        ]));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.upload_dir, "/srv/uploads");
        assert_eq!(config.storage.max_upload_bytes, 2048);
    }

    #[test]
    fn test_port_fallback_and_invalid_values() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("DP_CONF_SERVER_PORT", "not-a-port"),
            ("PORT", "7000"),
            ("DP_CONF_STORAGE_MAX_UPLOAD_BYTES", "lots"),
        ]));
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.storage.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
