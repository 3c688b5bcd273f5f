//! Application configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{WolfStreetError, WolfStreetResult};

static DEFAULT_DATABASE_PATH: &str = "~/.local/share/wolfstreet/wolfstreet.db";
static DEFAULT_APP_DOMAIN: &str = "wolfstreet.app";
static DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 4180;
static DEFAULT_MAIL_FROM: &str = "Wolf Street <calendar@wolfstreet.app>";

/// Prefix of environment overrides, e.g. `WOLFSTREET_SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "WOLFSTREET";

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_app_domain() -> String {
    DEFAULT_APP_DOMAIN.to_string()
}

fn default_server_url() -> String {
    format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}")
}

/// Configuration at ~/.config/wolfstreet/config.toml, overridable from the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Domain used in invite UIDs
    #[serde(default = "default_app_domain")]
    pub app_domain: String,

    #[serde(default)]
    pub server: ServerConfig,

    /// Base URL the CLI talks to
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Identity the CLI acts as
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// Conference-from-URL parsing service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Transactional e-mail API used for invites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "MailConfig::default_from")]
    pub from: String,
}

impl MailConfig {
    fn default_from() -> String {
        DEFAULT_MAIL_FROM.to_string()
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        MailConfig {
            endpoint: None,
            api_key: None,
            from: Self::default_from(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            app_domain: default_app_domain(),
            server: ServerConfig::default(),
            server_url: default_server_url(),
            user_id: None,
            ingest: IngestConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> WolfStreetResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| WolfStreetError::Config("Could not determine config directory".into()))?
            .join("wolfstreet");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/wolfstreet/config.toml, writing a commented default
    /// file first if there is none.
    pub fn load() -> WolfStreetResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` layered with `WOLFSTREET_*` environment variables.
    pub fn load_from(path: &Path) -> WolfStreetResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| WolfStreetError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| WolfStreetError::Config(e.to_string()))
    }

    pub fn database_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.database_path.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Identity the CLI acts as. Required for every user-scoped command.
    pub fn require_user_id(&self) -> WolfStreetResult<&str> {
        self.user_id.as_deref().ok_or_else(|| {
            WolfStreetError::Config(format!(
                "No user_id configured. Set user_id in {} or {ENV_PREFIX}_USER_ID",
                Self::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".into())
            ))
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> WolfStreetResult<()> {
        let contents = format!(
            "\
# Wolf Street configuration

# SQLite database used by the server:
# database_path = \"{DEFAULT_DATABASE_PATH}\"

# Domain used in calendar invite UIDs:
# app_domain = \"{DEFAULT_APP_DOMAIN}\"

# Your user id (used by the CLI):
# user_id = \"\"

# Where the CLI finds the server:
# server_url = \"http://{DEFAULT_HOST}:{DEFAULT_PORT}\"

# [server]
# host = \"{DEFAULT_HOST}\"
# port = {DEFAULT_PORT}

# Conference-from-URL parsing service:
# [ingest]
# endpoint = \"https://...\"
# api_key = \"\"

# E-mail API used for calendar invites:
# [mail]
# endpoint = \"https://...\"
# api_key = \"\"
# from = \"{DEFAULT_MAIL_FROM}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WolfStreetError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| WolfStreetError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wolfstreet").join("config.toml");
        AppConfig::create_default_config(&path).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.app_domain, "wolfstreet.app");
        assert_eq!(config.server.bind_address(), "127.0.0.1:4180");
        assert_eq!(config.server_url, "http://127.0.0.1:4180");
        assert!(config.ingest.endpoint.is_none());
        assert!(!config.database_path().to_string_lossy().starts_with('~'));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "user_id = \"u-42\"\n\n[server]\nport = 9000\n\n[mail]\nendpoint = \"https://mail.example/send\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.require_user_id().unwrap(), "u-42");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.mail.endpoint.as_deref(), Some("https://mail.example/send"));
        assert_eq!(config.mail.from, "Wolf Street <calendar@wolfstreet.app>");
    }
}
