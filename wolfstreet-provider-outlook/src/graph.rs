//! Microsoft Graph calendar calls.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::to_outlook::OutlookEvent;

pub const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

#[derive(Deserialize)]
struct CreatedEvent {
    id: String,
}

#[derive(Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        GraphClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create an event in the user's default calendar, returning its id.
    pub async fn create_event(&self, access_token: &str, event: &OutlookEvent) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/me/events", self.base_url))
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .context("Failed to reach Microsoft Graph")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Graph API returned {status}: {body}");
        }

        let created: CreatedEvent = response
            .json()
            .await
            .context("Failed to parse created event")?;

        Ok(created.id)
    }
}
