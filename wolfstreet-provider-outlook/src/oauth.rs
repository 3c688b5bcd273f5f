//! Microsoft identity platform authorization-code flow.

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;
use wolfstreet_core::outlook::protocol::TokenReply;

use crate::app_config::OutlookAppConfig;

pub const LOGIN_BASE: &str = "https://login.microsoftonline.com";

pub const SCOPES: &[&str] = &["Calendars.ReadWrite", "offline_access"];

/// Authorization page the user is sent to.
pub fn authorization_url(config: &OutlookAppConfig, login_base: &str) -> Result<String> {
    let endpoint = format!(
        "{}/{}/oauth2/v2.0/authorize",
        login_base.trim_end_matches('/'),
        config.tenant
    );
    let scope = SCOPES.join(" ");

    let url = Url::parse_with_params(
        &endpoint,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("response_mode", "query"),
            ("scope", scope.as_str()),
        ],
    )
    .with_context(|| format!("Invalid authorization endpoint {endpoint}"))?;

    Ok(url.into())
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &OutlookAppConfig,
    login_base: &str,
    code: &str,
) -> Result<TokenReply> {
    let endpoint = format!(
        "{}/{}/oauth2/v2.0/token",
        login_base.trim_end_matches('/'),
        config.tenant
    );
    let scope = SCOPES.join(" ");

    let response = http
        .post(&endpoint)
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
            ("scope", scope.as_str()),
        ])
        .send()
        .await
        .context("Failed to send token request to Microsoft")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read token response")?;

    if !status.is_success() {
        let detail = serde_json::from_str::<TokenError>(&body)
            .map(|e| match e.error_description {
                Some(description) => format!("{}: {description}", e.error),
                None => e.error,
            })
            .unwrap_or(body);
        anyhow::bail!("Token exchange failed ({status}): {detail}");
    }

    let token: TokenResponse =
        serde_json::from_str(&body).context("Failed to parse token response")?;

    Ok(TokenReply {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_in: token.expires_in,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> OutlookAppConfig {
        OutlookAppConfig {
            client_id: "client-123".into(),
            client_secret: "s3cret".into(),
            redirect_uri: "http://localhost:8085/callback".into(),
            tenant: "common".into(),
        }
    }

    #[test]
    fn authorization_url_requests_calendar_scopes() {
        let url = Url::parse(&authorization_url(&config(), LOGIN_BASE).unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("login.microsoftonline.com"));
        assert_eq!(url.path(), "/common/oauth2/v2.0/authorize");

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["response_mode"], "query");
        assert_eq!(params["scope"], "Calendars.ReadWrite offline_access");
        assert_eq!(params["redirect_uri"], "http://localhost:8085/callback");
    }

    #[tokio::test]
    async fn exchanges_code_for_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/common/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "access_token": "eyJ0",
                "refresh_token": "M.R3",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = exchange_code(&reqwest::Client::new(), &config(), &server.uri(), "auth-code")
            .await
            .unwrap();

        assert_eq!(reply.access_token, "eyJ0");
        assert_eq!(reply.refresh_token.as_deref(), Some("M.R3"));
        assert_eq!(reply.expires_in, 3599);
    }

    #[tokio::test]
    async fn rejected_code_surfaces_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "AADSTS70008: The provided authorization code has expired."
            })))
            .mount(&server)
            .await;

        let err = exchange_code(&reqwest::Client::new(), &config(), &server.uri(), "stale")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("invalid_grant: AADSTS70008"));
    }
}
