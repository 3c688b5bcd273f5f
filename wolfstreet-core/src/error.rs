//! Error types for Wolf Street.

use thiserror::Error;

/// Errors that can occur in Wolf Street operations.
#[derive(Error, Debug)]
pub enum WolfStreetError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Form-level problems caught before any store write.
    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Account is awaiting approval")]
    NotApproved,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Remote call failed: {0}")]
    Remote(String),

    #[error("{0}")]
    SetupRequired(String),

    #[error("Outlook is not connected")]
    NotConnected,

    #[error("Outlook session expired, please reconnect")]
    SessionExpired,

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WolfStreetError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        WolfStreetError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for WolfStreetError {
    fn from(e: serde_json::Error) -> Self {
        WolfStreetError::Serialization(e.to_string())
    }
}

/// Result type alias for Wolf Street operations.
pub type WolfStreetResult<T> = Result<T, WolfStreetError>;
