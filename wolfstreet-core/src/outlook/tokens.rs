use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::protocol::TokenReply;
use crate::error::{WolfStreetError, WolfStreetResult};

/// Fixed key the tokens are stored under.
pub const OUTLOOK_TOKENS_KEY: &str = "outlook_tokens";

/// Client-held Outlook OAuth tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlookTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry as epoch milliseconds
    pub expires_at: i64,
}

impl OutlookTokens {
    pub fn from_reply(reply: TokenReply, now: DateTime<Utc>) -> Self {
        OutlookTokens {
            access_token: reply.access_token,
            refresh_token: reply.refresh_token,
            expires_at: (now + Duration::seconds(reply.expires_in)).timestamp_millis(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp_millis()
    }
}

/// Persistence for the single set of Outlook tokens a session holds.
pub trait TokenStore {
    fn load(&self) -> WolfStreetResult<Option<OutlookTokens>>;
    fn save(&self, tokens: &OutlookTokens) -> WolfStreetResult<()>;
    fn clear(&self) -> WolfStreetResult<()>;
}

/// Tokens as an owner-only JSON file in the local data directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: &Path) -> Self {
        FileTokenStore {
            path: dir.join(format!("{OUTLOOK_TOKENS_KEY}.json")),
        }
    }

    /// `~/.local/share/wolfstreet/outlook_tokens.json` (platform equivalent)
    pub fn default_location() -> WolfStreetResult<Self> {
        let dir = dirs::data_local_dir()
            .ok_or_else(|| WolfStreetError::Config("Could not determine data directory".into()))?
            .join("wolfstreet");
        Ok(FileTokenStore::new(&dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> WolfStreetResult<Option<OutlookTokens>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, tokens: &OutlookTokens) -> WolfStreetResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(tokens)?;

        // Owner-only from creation, the file holds OAuth tokens
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // An older file keeps its mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> WolfStreetResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
