//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for the server, auth, and picture storage. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Largest picture accepted by default (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, failing if it is missing or
    /// malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.auth.enabled && self.auth.api_key.as_deref().unwrap_or("").is_empty() {
            warnings.push("auth is enabled but no api_key is set; every request will be rejected".into());
        }

        if self.storage.max_upload_bytes == 0 {
            warnings.push("storage.max_upload_bytes is 0; every upload will be rejected".into());
        }

        if self.storage.io_timeout_secs == 0 {
            warnings.push("storage.io_timeout_secs is 0; every storage operation will time out".into());
        }

        if !self.storage.public_base_url.starts_with('/')
            && !self.storage.public_base_url.starts_with("http://")
            && !self.storage.public_base_url.starts_with("https://")
        {
            warnings.push(format!(
                "storage.public_base_url '{}' is neither an absolute path nor an http(s) URL",
                self.storage.public_base_url
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db_path: PathBuf::from("./data/hotelier.db"),
        }
    }
}

/// Authentication settings.
///
/// Staff clients send `Authorization: Bearer <api_key>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
}

/// Picture blob storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory that holds the public disk (pictures live under `pictures/`).
    pub root_dir: PathBuf,
    /// URL prefix under which `root_dir` is served.
    pub public_base_url: String,
    pub max_upload_bytes: u64,
    pub io_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./data/storage"),
            public_base_url: "/storage".into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            io_timeout_secs: 10,
        }
    }
}

impl StorageConfig {
    /// Public URL of a stored blob.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }
}
