//! HTTP client for communicating with wolfstreet-server

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use wolfstreet_core::config::AppConfig;
use wolfstreet_core::ingest::{ConferenceFields, IngestRequest, ParseResult};
use wolfstreet_core::linker::{CreateOutcome, EditOutcome, LinkOutcome};
use wolfstreet_core::outlook::OutlookProxy;
use wolfstreet_core::outlook::protocol::{
    AuthUrlReply, OutlookRequest, ProxyReply, SyncReport, TokenReply,
};
use wolfstreet_core::session::USER_HEADER;
use wolfstreet_core::{
    CalendarEvent, Conference, ConferenceDraft, ConferencePatch, NewCalendarEvent, Profile,
    TravelDays, WolfStreetError, WolfStreetResult,
};

/// HTTP client for wolfstreet-server
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
}

#[derive(Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct InviteResponse {
    pub sent_to: String,
}

#[derive(Serialize)]
struct ConferenceWithTravel<'a, T: Serialize> {
    #[serde(flatten)]
    body: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    travel: Option<TravelDays>,
}

impl Client {
    pub fn new(base_url: &str, user_id: &str) -> Self {
        Client {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(&config.server_url, config.require_user_id()?))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "api request");
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(USER_HEADER, &self.user_id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let resp = request
            .send()
            .await
            .with_context(|| format!("Failed to connect to server at {}", self.base_url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = match resp.json::<ErrorResponse>().await {
                Ok(err) => err.error,
                Err(_) => status.to_string(),
            };
            anyhow::bail!("{message}");
        }

        Ok(resp)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        Ok(resp.json().await?)
    }

    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self.send(self.request(method, path).json(body)).await?;
        Ok(resp.json().await?)
    }

    // PROFILES:

    /// POST /profiles
    pub async fn register(&self, email: &str, full_name: Option<&str>) -> Result<Profile> {
        let body = json!({ "user_id": self.user_id, "email": email, "full_name": full_name });
        self.call(Method::POST, "/profiles", &body).await
    }

    /// GET /me
    pub async fn me(&self) -> Result<Profile> {
        self.get("/me").await
    }

    /// GET /admin/profiles
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.get("/admin/profiles").await
    }

    /// POST /admin/profiles/:id/approval
    pub async fn set_approval(&self, user_id: &str, approved: bool) -> Result<Profile> {
        let path = format!("/admin/profiles/{user_id}/approval");
        self.call(Method::POST, &path, &json!({ "approved": approved })).await
    }

    /// POST /admin/profiles/:id/admin
    pub async fn set_admin(&self, user_id: &str, admin: bool) -> Result<Profile> {
        let path = format!("/admin/profiles/{user_id}/admin");
        self.call(Method::POST, &path, &json!({ "admin": admin })).await
    }

    // CONFERENCES:

    /// GET /conferences
    pub async fn list_conferences(&self) -> Result<Vec<Conference>> {
        self.get("/conferences").await
    }

    /// POST /conferences
    pub async fn create_conference(
        &self,
        draft: &ConferenceDraft,
        travel: Option<TravelDays>,
    ) -> Result<CreateOutcome> {
        let body = ConferenceWithTravel { body: draft, travel };
        self.call(Method::POST, "/conferences", &body).await
    }

    /// PATCH /conferences/:id
    pub async fn edit_conference(
        &self,
        id: &str,
        patch: &ConferencePatch,
        travel: Option<TravelDays>,
    ) -> Result<EditOutcome> {
        let body = ConferenceWithTravel { body: patch, travel };
        self.call(Method::PATCH, &format!("/conferences/{id}"), &body).await
    }

    /// POST /conferences/:id/calendar-event
    pub async fn create_calendar_event_for_conference(
        &self,
        id: &str,
        travel: Option<TravelDays>,
    ) -> Result<LinkOutcome> {
        let path = format!("/conferences/{id}/calendar-event");
        self.call(Method::POST, &path, &json!({ "travel": travel })).await
    }

    /// POST /conferences/:id/link
    pub async fn link_calendar_event(&self, id: &str, calendar_event_id: &str) -> Result<Conference> {
        #[derive(Deserialize)]
        struct LinkResponse {
            conference: Conference,
        }

        let path = format!("/conferences/{id}/link");
        let resp: LinkResponse = self
            .call(Method::POST, &path, &json!({ "calendar_event_id": calendar_event_id }))
            .await?;
        Ok(resp.conference)
    }

    // CALENDAR EVENTS:

    /// GET /calendar-events
    pub async fn list_calendar_events(&self, from: Option<NaiveDate>) -> Result<Vec<CalendarEvent>> {
        match from {
            Some(from) => self.get(&format!("/calendar-events?from={from}")).await,
            None => self.get("/calendar-events").await,
        }
    }

    /// POST /calendar-events
    pub async fn create_calendar_event(&self, event: &NewCalendarEvent) -> Result<CalendarEvent> {
        self.call(Method::POST, "/calendar-events", event).await
    }

    /// DELETE /calendar-events/:id
    pub async fn delete_calendar_event(&self, id: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/calendar-events/{id}")))
            .await?;
        Ok(())
    }

    /// POST /calendar-events/:id/invite
    pub async fn send_invite(&self, id: &str, test_email: Option<&str>) -> Result<InviteResponse> {
        let path = format!("/calendar-events/{id}/invite");
        self.call(Method::POST, &path, &json!({ "test_email": test_email })).await
    }

    // IMPORT:

    /// GET /import/candidates
    pub async fn import_candidates(&self) -> Result<Vec<CalendarEvent>> {
        self.get("/import/candidates").await
    }

    /// POST /import
    pub async fn import(&self, event_ids: &[String]) -> Result<Vec<Conference>> {
        self.call(Method::POST, "/import", &json!({ "event_ids": event_ids })).await
    }

    // INGEST:

    /// POST /ingest
    pub async fn ingest(&self, url: &str) -> Result<ParseResult> {
        let body = IngestRequest { url: url.to_string() };
        self.call(Method::POST, "/ingest", &body).await
    }

    /// POST /ingest/save
    pub async fn save_ingested(
        &self,
        conference_id: Option<&str>,
        fields: &ConferenceFields,
        source_url: &str,
        travel: Option<TravelDays>,
    ) -> Result<EditOutcome> {
        let body = json!({
            "conference_id": conference_id,
            "fields": fields,
            "source_url": source_url,
            "travel": travel,
        });
        self.call(Method::POST, "/ingest/save", &body).await
    }

    // OUTLOOK:

    /// POST /functions/outlook-calendar. Error replies come back in the body
    /// with a non-success status, so they are parsed rather than bailed on.
    async fn outlook_action<T: DeserializeOwned>(&self, request: &OutlookRequest) -> WolfStreetResult<T> {
        let resp = self
            .request(Method::POST, "/functions/outlook-calendar")
            .json(request)
            .send()
            .await
            .map_err(|e| WolfStreetError::Remote(format!("Failed to reach server: {e}")))?;

        let reply: ProxyReply<T> = resp
            .json()
            .await
            .map_err(|e| WolfStreetError::Remote(format!("Unreadable Outlook reply: {e}")))?;
        reply.into_result()
    }
}

impl OutlookProxy for Client {
    async fn auth_url(&self) -> WolfStreetResult<String> {
        let reply: AuthUrlReply = self.outlook_action(&OutlookRequest::AuthUrl).await?;
        Ok(reply.auth_url)
    }

    async fn exchange_token(&self, code: &str) -> WolfStreetResult<TokenReply> {
        self.outlook_action(&OutlookRequest::ExchangeToken {
            code: code.to_string(),
        })
        .await
    }

    async fn sync(&self, access_token: &str, events: &[CalendarEvent]) -> WolfStreetResult<SyncReport> {
        self.outlook_action(&OutlookRequest::Sync {
            access_token: access_token.to_string(),
            events: events.to_vec(),
        })
        .await
    }
}
