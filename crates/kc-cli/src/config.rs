//! CLI configuration, persisted as TOML in the user's home directory.

use std::path::{Path, PathBuf};

use kc_admin_client::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::{CliError, CliResult};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Server URL (e.g., http://localhost:8080).
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Realm to administer when `--realm` is not given.
    pub default_realm: Option<String>,

    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Maximum concurrent role fetches when listing users.
    pub enrichment_concurrency: Option<usize>,

    /// Authentication configuration.
    pub auth: Option<AuthConfig>,
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            default_realm: None,
            output_format: OutputFormat::default(),
            enrichment_concurrency: None,
            auth: None,
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default location, or defaults if absent.
    pub fn load() -> CliResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from a file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Saves configuration to the default location.
    pub fn save(&self) -> CliResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves configuration to a file, creating its directory.
    pub fn save_to(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Gets the configuration file path.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".keycloak").join("kc.toml"))
    }

    /// Gets the effective realm (from args or config).
    pub fn effective_realm(&self, arg_realm: Option<&str>) -> CliResult<String> {
        arg_realm
            .map(ToString::to_string)
            .or_else(|| self.default_realm.clone())
            .ok_or_else(|| {
                CliError::InvalidArgument(
                    "realm is required (--realm or default_realm)".to_string(),
                )
            })
    }

    /// Authentication settings, or the `admin-cli` defaults.
    pub fn auth_or_default(&self) -> AuthConfig {
        self.auth.clone().unwrap_or_default()
    }

    /// Client settings for one invocation.
    pub fn client_config(&self, server: Option<&str>, realm: &str) -> ClientConfig {
        let mut config = ClientConfig::new(server.unwrap_or(&self.server_url), realm);
        if let Some(concurrency) = self.enrichment_concurrency {
            config.enrichment_concurrency = concurrency;
        }
        config
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (minimal output).
    Quiet,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            _ => Err(CliError::InvalidArgument(format!(
                "unknown output format: {s}. Supported: table, json, quiet"
            ))),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Realm the administrator logs into.
    #[serde(default = "default_auth_realm")]
    pub realm: String,
    /// Client ID for authentication.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Client secret (if confidential client).
    pub client_secret: Option<String>,
    /// Username for password grant.
    pub username: Option<String>,
}

fn default_auth_realm() -> String {
    "master".to_string()
}

fn default_client_id() -> String {
    "admin-cli".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realm: default_auth_realm(),
            client_id: default_client_id(),
            client_secret: None,
            username: None,
        }
    }
}
