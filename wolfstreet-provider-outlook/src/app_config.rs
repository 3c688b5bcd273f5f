//! App-level configuration for the Outlook proxy.
//!
//! OAuth client credentials are stored at:
//!   ~/.config/wolfstreet/providers/outlook/app_config.toml
//! with `MICROSOFT_CLIENT_ID` / `MICROSOFT_CLIENT_SECRET` /
//! `MICROSOFT_REDIRECT_URI` as a fallback.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the CLI listens for the OAuth redirect by default.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8085/callback";

fn default_tenant() -> String {
    "common".to_string()
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

/// Microsoft identity platform app registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlookAppConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Directory tenant; `common` accepts work and personal accounts
    #[serde(default = "default_tenant")]
    pub tenant: String,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("wolfstreet")
        .join("providers")
        .join("outlook"))
}

impl OutlookAppConfig {
    pub fn path() -> Result<PathBuf> {
        Ok(base_dir()?.join("app_config.toml"))
    }

    /// Credentials from app_config.toml, else from the environment.
    /// `None` means the integration is not configured.
    pub fn load() -> Result<Option<Self>> {
        let path = Self::path()?;
        if path.exists() {
            return Self::load_from(&path).map(Some);
        }

        Ok(Self::from_env(|key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Outlook credentials from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse Outlook credentials from {}", path.display()))
    }

    /// Build from environment lookups. Both the client id and secret must be
    /// present and non-empty.
    pub fn from_env(var: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Some(OutlookAppConfig {
            client_id: get("MICROSOFT_CLIENT_ID")?,
            client_secret: get("MICROSOFT_CLIENT_SECRET")?,
            redirect_uri: get("MICROSOFT_REDIRECT_URI").unwrap_or_else(default_redirect_uri),
            tenant: get("MICROSOFT_TENANT").unwrap_or_else(default_tenant),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_requires_id_and_secret() {
        let vars: HashMap<&str, &str> = HashMap::from([("MICROSOFT_CLIENT_ID", "abc")]);
        assert!(OutlookAppConfig::from_env(|k| vars.get(k).map(|v| v.to_string())).is_none());

        let vars: HashMap<&str, &str> = HashMap::from([
            ("MICROSOFT_CLIENT_ID", "abc"),
            ("MICROSOFT_CLIENT_SECRET", "s3cret"),
        ]);
        let config = OutlookAppConfig::from_env(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.tenant, "common");
    }

    #[test]
    fn file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_config.toml");
        std::fs::write(&path, "client_id = \"abc\"\nclient_secret = \"s3cret\"\ntenant = \"contoso.onmicrosoft.com\"\n").unwrap();

        let config = OutlookAppConfig::load_from(&path).unwrap();
        assert_eq!(config.tenant, "contoso.onmicrosoft.com");
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
    }
}
