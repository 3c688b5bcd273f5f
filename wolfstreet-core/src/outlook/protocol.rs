//! Outlook proxy protocol types.
//!
//! Defines the JSON exchanged with the server-side Outlook proxy. Requests
//! are tagged by `action`; replies are camelCase.

use serde::{Deserialize, Serialize};

use crate::calendar_event::CalendarEvent;
use crate::error::{WolfStreetError, WolfStreetResult};

/// Error code returned when the proxy has no client credentials.
pub const NOT_CONFIGURED: &str = "not_configured";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutlookRequest {
    AuthUrl,
    ExchangeToken {
        code: String,
    },
    Sync {
        #[serde(rename = "accessToken")]
        access_token: String,
        #[serde(default)]
        events: Vec<CalendarEvent>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlReply {
    pub auth_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReply {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedEvent {
    pub event_id: String,
    pub outlook_id: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub event_id: String,
    pub error: String,
}

/// Per-event outcome of a push. The batch never aborts on one failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    pub synced: usize,
    pub failed: usize,
    #[serde(default)]
    pub results: Vec<SyncedEvent>,
    #[serde(default)]
    pub errors: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn record_success(&mut self, event_id: &str, outlook_id: &str) {
        self.results.push(SyncedEvent {
            event_id: event_id.to_string(),
            outlook_id: outlook_id.to_string(),
            success: true,
        });
        self.synced += 1;
        self.success = self.failed == 0;
    }

    pub fn record_failure(&mut self, event_id: &str, error: impl Into<String>) {
        self.errors.push(SyncFailure {
            event_id: event_id.to_string(),
            error: error.into(),
        });
        self.failed += 1;
        self.success = false;
    }

    /// An empty push trivially succeeds.
    pub fn finish(mut self) -> Self {
        self.success = self.failed == 0;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorReply {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorReply {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// Either a typed reply or an error reply, as sent by the proxy.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProxyReply<T> {
    Error(ErrorReply),
    Ok(T),
}

impl<T> ProxyReply<T> {
    pub fn into_result(self) -> WolfStreetResult<T> {
        match self {
            ProxyReply::Ok(value) => Ok(value),
            ProxyReply::Error(e) if e.error == NOT_CONFIGURED => Err(WolfStreetError::SetupRequired(
                e.message
                    .unwrap_or_else(|| "Outlook integration requires setup".to_string()),
            )),
            ProxyReply::Error(e) => Err(WolfStreetError::Remote(match e.message {
                Some(message) => format!("{}: {message}", e.error),
                None => e.error,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_tagged_by_action() {
        let json = serde_json::to_value(OutlookRequest::AuthUrl).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "auth_url" }));

        let req: OutlookRequest =
            serde_json::from_str(r#"{ "action": "exchange_token", "code": "abc" }"#).unwrap();
        assert!(matches!(req, OutlookRequest::ExchangeToken { code } if code == "abc"));

        let req: OutlookRequest =
            serde_json::from_str(r#"{ "action": "sync", "accessToken": "tok", "events": [] }"#).unwrap();
        assert!(matches!(req, OutlookRequest::Sync { access_token, .. } if access_token == "tok"));
    }

    #[test]
    fn report_serializes_camel_case() {
        let mut report = SyncReport::default();
        report.record_success("e1", "AAMk1");
        report.record_failure("e2", "400 Bad Request");

        let json = serde_json::to_value(report.finish()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["results"][0]["outlookId"], "AAMk1");
        assert_eq!(json["errors"][0]["eventId"], "e2");
    }

    #[test]
    fn not_configured_reply_means_setup_required() {
        let reply: ProxyReply<AuthUrlReply> = serde_json::from_str(
            r#"{ "error": "not_configured", "message": "Outlook integration requires setup" }"#,
        )
        .unwrap();
        assert!(matches!(reply.into_result(), Err(WolfStreetError::SetupRequired(_))));

        let reply: ProxyReply<AuthUrlReply> =
            serde_json::from_str(r#"{ "authUrl": "https://login.example/authorize" }"#).unwrap();
        assert_eq!(reply.into_result().unwrap().auth_url, "https://login.example/authorize");
    }
}
