//! Request dispatch for the Outlook proxy.

use serde::Serialize;
use tracing::{info, warn};
use wolfstreet_core::CalendarEvent;
use wolfstreet_core::outlook::protocol::{
    AuthUrlReply, ErrorReply, NOT_CONFIGURED, OutlookRequest, SyncReport, TokenReply,
};

use crate::app_config::OutlookAppConfig;
use crate::graph::{GRAPH_API_BASE, GraphClient};
use crate::oauth::{self, LOGIN_BASE};
use crate::to_outlook::ToOutlook;

const SETUP_MESSAGE: &str = "Outlook integration requires setup. Add MICROSOFT_CLIENT_ID and \
     MICROSOFT_CLIENT_SECRET (or providers/outlook/app_config.toml) on the server.";

/// Body returned for any proxy request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutlookReply {
    AuthUrl(AuthUrlReply),
    Token(TokenReply),
    Sync(SyncReport),
    Error(ErrorReply),
}

impl OutlookReply {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, OutlookReply::Error(e) if e.error == NOT_CONFIGURED)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OutlookReply::Error(_))
    }
}

pub struct OutlookService {
    http: reqwest::Client,
    config: Option<OutlookAppConfig>,
    login_base: String,
    graph: GraphClient,
}

impl OutlookService {
    pub fn new(config: Option<OutlookAppConfig>) -> Self {
        Self::with_endpoints(config, LOGIN_BASE, GRAPH_API_BASE)
    }

    /// Point the service at other identity and Graph hosts.
    pub fn with_endpoints(
        config: Option<OutlookAppConfig>,
        login_base: &str,
        graph_base: &str,
    ) -> Self {
        let http = reqwest::Client::new();
        OutlookService {
            graph: GraphClient::new(http.clone(), graph_base),
            http,
            config,
            login_base: login_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub async fn handle(&self, request: OutlookRequest) -> OutlookReply {
        let Some(config) = &self.config else {
            return OutlookReply::Error(ErrorReply::with_message(NOT_CONFIGURED, SETUP_MESSAGE));
        };

        match request {
            OutlookRequest::AuthUrl => match oauth::authorization_url(config, &self.login_base) {
                Ok(auth_url) => OutlookReply::AuthUrl(AuthUrlReply { auth_url }),
                Err(e) => OutlookReply::Error(ErrorReply::with_message(
                    "auth_url_failed",
                    format!("{e:#}"),
                )),
            },
            OutlookRequest::ExchangeToken { code } => {
                match oauth::exchange_code(&self.http, config, &self.login_base, &code).await {
                    Ok(token) => OutlookReply::Token(token),
                    Err(e) => {
                        warn!(error = %format!("{e:#}"), "token exchange failed");
                        OutlookReply::Error(ErrorReply::with_message(
                            "token_exchange_failed",
                            format!("{e:#}"),
                        ))
                    }
                }
            }
            OutlookRequest::Sync {
                access_token,
                events,
            } => OutlookReply::Sync(self.sync(&access_token, &events).await),
        }
    }

    /// Push events one by one. A rejected event is recorded and the rest
    /// still go out.
    async fn sync(&self, access_token: &str, events: &[CalendarEvent]) -> SyncReport {
        let mut report = SyncReport::default();

        for event in events {
            match self.graph.create_event(access_token, &event.to_outlook()).await {
                Ok(outlook_id) => report.record_success(&event.id, &outlook_id),
                Err(e) => {
                    warn!(event_id = %event.id, error = %format!("{e:#}"), "outlook push failed");
                    report.record_failure(&event.id, format!("{e:#}"));
                }
            }
        }

        let report = report.finish();
        info!(synced = report.synced, failed = report.failed, "outlook sync finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wolfstreet_core::{EventType, TravelDays};

    fn config() -> OutlookAppConfig {
        OutlookAppConfig {
            client_id: "client-123".into(),
            client_secret: "s3cret".into(),
            redirect_uri: "http://localhost:8085/callback".into(),
            tenant: "common".into(),
        }
    }

    fn event(id: &str, title: &str, day: u32) -> CalendarEvent {
        CalendarEvent {
            id: id.into(),
            user_id: "u1".into(),
            title: title.into(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            end_date: None,
            start_time: None,
            end_time: None,
            all_day: true,
            location: None,
            event_type: EventType::Meeting,
            type_custom: None,
            color_hex: None,
            icon_name: None,
            invite_email: None,
            travel: TravelDays::default(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn unconfigured_service_reports_setup_required() {
        let service = OutlookService::new(None);

        let reply = service.handle(OutlookRequest::AuthUrl).await;
        assert!(reply.is_not_configured());

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["error"], "not_configured");
        assert!(json["message"].as_str().unwrap().contains("MICROSOFT_CLIENT_ID"));
    }

    #[tokio::test]
    async fn auth_url_reply_is_camel_case() {
        let service = OutlookService::new(Some(config()));

        let json = serde_json::to_value(service.handle(OutlookRequest::AuthUrl).await).unwrap();
        let url = json["authUrl"].as_str().unwrap();
        assert!(url.starts_with("https://login.microsoftonline.com/common/oauth2/v2.0/authorize?"));
    }

    #[tokio::test]
    async fn failed_exchange_is_an_error_reply() {
        let login = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
            .mount(&login)
            .await;

        let service = OutlookService::with_endpoints(Some(config()), &login.uri(), GRAPH_API_BASE);
        let reply = service
            .handle(OutlookRequest::ExchangeToken { code: "bad".into() })
            .await;

        match reply {
            OutlookReply::Error(e) => {
                assert_eq!(e.error, "token_exchange_failed");
                assert!(e.message.unwrap().contains("invalid_grant"));
            }
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn one_rejected_event_does_not_stop_the_batch() {
        let graph = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/events"))
            .and(body_partial_json(json!({ "subject": "Broken" })))
            .respond_with(ResponseTemplate::new(400).set_body_string("ErrorInvalidRequest"))
            .with_priority(1)
            .mount(&graph)
            .await;
        Mock::given(method("POST"))
            .and(path("/me/events"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "AAMkOutlook" })))
            .mount(&graph)
            .await;

        let service = OutlookService::with_endpoints(Some(config()), LOGIN_BASE, &graph.uri());
        let events = vec![
            event("e1", "Kickoff", 1),
            event("e2", "Broken", 2),
            event("e3", "Review", 3),
        ];

        let reply = service
            .handle(OutlookRequest::Sync {
                access_token: "tok".into(),
                events,
            })
            .await;

        let OutlookReply::Sync(report) = reply else {
            panic!("expected sync reply");
        };
        assert!(!report.success);
        assert_eq!(report.synced, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].event_id, "e2");
        assert!(report.errors[0].error.contains("400"));
        assert_eq!(
            report.results.iter().map(|r| r.event_id.as_str()).collect::<Vec<_>>(),
            vec!["e1", "e3"]
        );
    }

    #[tokio::test]
    async fn empty_sync_succeeds() {
        let service = OutlookService::new(Some(config()));
        let reply = service
            .handle(OutlookRequest::Sync {
                access_token: "tok".into(),
                events: Vec::new(),
            })
            .await;

        let json = serde_json::to_value(reply).unwrap();
        assert_eq!(json, json!({ "success": true, "synced": 0, "failed": 0, "results": [], "errors": [] }));
    }
}
