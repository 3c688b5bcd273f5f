//! Client for the conference-from-URL parsing service.

use tracing::{info, warn};
use wolfstreet_core::config::IngestConfig;
use wolfstreet_core::ingest::{IngestRequest, IngestResponse, ParseResult};
use wolfstreet_core::{WolfStreetError, WolfStreetResult};

#[derive(Clone)]
pub struct IngestClient {
    http: reqwest::Client,
    config: IngestConfig,
}

impl IngestClient {
    pub fn new(http: reqwest::Client, config: IngestConfig) -> Self {
        IngestClient { http, config }
    }

    /// Ask the service to parse a conference page. One attempt, no retry.
    pub async fn parse(&self, url: &str) -> WolfStreetResult<ParseResult> {
        let Some(endpoint) = self.config.endpoint.as_deref() else {
            return Err(WolfStreetError::SetupRequired(
                "Conference ingestion is not configured (ingest.endpoint)".into(),
            ));
        };

        let mut request = self.http.post(endpoint).json(&IngestRequest {
            url: url.to_string(),
        });
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(url, error = %e, "ingestion service unreachable");
            WolfStreetError::Remote(format!("Ingestion service unreachable: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url, %status, "ingestion service rejected request");
            return Err(WolfStreetError::Remote(format!(
                "Ingestion service returned {status}: {body}"
            )));
        }

        let body: IngestResponse = response.json().await.map_err(|e| {
            warn!(url, error = %e, "ingestion reply unreadable");
            WolfStreetError::Remote(format!("Unreadable ingestion reply: {e}"))
        })?;

        let result = ParseResult::from_response(body);
        info!(
            url,
            parsed = result.fields().is_some(),
            stub = matches!(result, ParseResult::FallbackStub(_)),
            "conference page processed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(endpoint: Option<String>) -> IngestClient {
        IngestClient::new(
            reqwest::Client::new(),
            IngestConfig {
                endpoint,
                api_key: Some("svc-key".into()),
            },
        )
    }

    #[tokio::test]
    async fn fetch_failure_marker_yields_fallback_stub() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer svc-key"))
            .and(body_json(json!({ "url": "https://rsaconference.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "conference": { "name": "RSA Conference" },
                "raw": { "error": "fetch_failed", "details": "timeout" }
            })))
            .mount(&server)
            .await;

        let result = client(Some(server.uri()))
            .parse("https://rsaconference.com")
            .await
            .unwrap();

        let ParseResult::FallbackStub(fields) = result else {
            panic!("expected a fallback stub");
        };
        assert_eq!(fields.name.as_deref(), Some("RSA Conference"));
        assert_eq!(fields.missing(), vec!["start_date", "end_date", "location"]);
    }

    #[tokio::test]
    async fn server_error_is_remote() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(Some(server.uri())).parse("https://x.test").await.unwrap_err();
        assert!(matches!(err, WolfStreetError::Remote(ref m) if m.contains("500")));
    }

    #[tokio::test]
    async fn missing_endpoint_requires_setup() {
        let err = client(None).parse("https://x.test").await.unwrap_err();
        assert!(matches!(err, WolfStreetError::SetupRequired(_)));
    }
}
