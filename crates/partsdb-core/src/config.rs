use crate::error::{PartsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "partsdb.yaml";
pub const DSN_ENV: &str = "DB_DSN";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_dsn")]
    pub dsn: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_dsn() -> String {
    "postgres://ecad:ecadpw@db:5432/ecad".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: default_dsn(),
            max_connections: default_max_connections(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// When set, KiCad must send `Authorization: Token <token>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// LibraryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "default_library_name")]
    pub name: String,
    #[serde(default = "default_library_description")]
    pub description: String,
    /// Public base URL of the API as KiCad sees it, without `/v1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,
}

fn default_library_name() -> String {
    "Parts Database".to_string()
}

fn default_library_description() -> String {
    "Parts served by partsdb".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: default_library_name(),
            description: default_library_description(),
            root_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

impl Config {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Apply `DB_DSN` from the environment, then an explicit DSN if given.
    pub fn with_overrides(mut self, env_dsn: Option<String>, dsn: Option<String>) -> Self {
        if let Some(d) = env_dsn.filter(|d| !d.trim().is_empty()) {
            self.database.dsn = d;
        }
        if let Some(d) = dsn.filter(|d| !d.trim().is_empty()) {
            self.database.dsn = d;
        }
        self
    }

    /// URL KiCad should use as `root_url` in a `.kicad_httplib` file.
    pub fn root_url(&self) -> String {
        if let Some(url) = &self.library.root_url {
            return url.trim_end_matches('/').to_string();
        }
        let host = match self.server.host.as_str() {
            "0.0.0.0" | "::" | "" => "localhost",
            h => h,
        };
        format!("http://{}:{}/kicad-api", host, self.server.port)
    }

    /// Fail on the first error-level warning.
    pub fn ensure_valid(&self) -> Result<()> {
        match self
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            Some(w) => Err(PartsError::Config(w.message)),
            None => Ok(()),
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let dsn = self.database.dsn.trim();
        if dsn.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "database.dsn is empty".to_string(),
            });
        } else if !(dsn.starts_with("postgres://") || dsn.starts_with("postgresql://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "database.dsn must be a postgres:// or postgresql:// URL, got '{}'",
                    dsn.split("://").next().unwrap_or(dsn)
                ),
            });
        }

        if self.database.max_connections == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "database.max_connections must be at least 1".to_string(),
            });
        }

        if self.server.port == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "server.port is 0; the OS will pick a port".to_string(),
            });
        }

        if self.server.token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "server.token is empty; requests will not be authenticated".to_string(),
            });
        }

        warnings
    }
}
