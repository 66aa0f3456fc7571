//! Configuration structs.
//!
//! Plain serde structs with field defaults, loadable from TOML. Every field
//! has a sensible default so an empty file (or no file) yields a working
//! development configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level Biblio configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiblioConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Search backend settings.
    #[serde(default)]
    pub index: IndexConfig,

    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl BiblioConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Search backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Backend type: "memory" or an external engine identifier.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// External engine URL, when the backend is remote.
    pub url: Option<String>,

    /// Index name to query.
    #[serde(default = "default_index_name")]
    pub index_name: String,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Disable to run without bearer tokens (development only).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8085
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_index_name() -> String {
    "documents".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            index_name: default_index_name(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BiblioConfig::default();
        assert_eq!(config.api.port, 8085);
        assert_eq!(config.index.backend, "memory");
        assert_eq!(config.index.index_name, "documents");
        assert!(config.auth.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: BiblioConfig = toml::from_str("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.index.backend, "memory");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biblio.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[index]\nbackend = \"opensearch\"\nurl = \"http://localhost:9200\"").unwrap();

        let config = BiblioConfig::load(&path).unwrap();
        assert_eq!(config.index.backend, "opensearch");
        assert_eq!(config.index.url.as_deref(), Some("http://localhost:9200"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = BiblioConfig::load(Path::new("/nonexistent/biblio.toml"));
        assert!(result.is_err());
    }
}
