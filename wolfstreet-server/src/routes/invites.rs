//! E-mailed calendar invites

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use wolfstreet_core::ics::{INVITE_FILENAME, generate_invite};
use wolfstreet_core::{CalendarEvent, WolfStreetError};

use crate::mailer::{Attachment, OutgoingMail};
use crate::routes::{AppError, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/calendar-events/{id}/invite", post(send_invite))
}

#[derive(Deserialize, Default)]
pub struct InviteRequest {
    /// Overrides every other recipient
    #[serde(default)]
    pub test_email: Option<String>,
}

#[derive(Serialize)]
pub struct InviteResponse {
    pub sent_to: String,
}

/// POST /calendar-events/:id/invite - Mail the event as an .ics attachment
async fn send_invite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<InviteRequest>,
) -> Result<Json<InviteResponse>, AppError> {
    let event = state.store.get_calendar_event(&user.user_id, &id)?;

    let recipient = [req.test_email.as_deref(), event.invite_email.as_deref(), Some(user.email.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|email| !email.is_empty())
        .ok_or_else(|| WolfStreetError::Validation("No recipient e-mail for this invite".into()))?
        .to_string();

    let ics = generate_invite(&event, &state.config.app_domain, Utc::now())?;

    let mail = OutgoingMail {
        from: state.mailer.from_address().to_string(),
        to: vec![recipient.clone()],
        subject: format!("Calendar invite: {}", event.title),
        html: invite_html(&event),
        attachments: vec![Attachment {
            filename: INVITE_FILENAME.to_string(),
            content: STANDARD.encode(ics),
        }],
    };
    state.mailer.send(&mail).await?;

    tracing::info!(event_id = %event.id, "invite sent");
    Ok(Json(InviteResponse { sent_to: recipient }))
}

fn invite_html(event: &CalendarEvent) -> String {
    let when = match event.end_date {
        Some(end) if end != event.start_date => format!(
            "{} to {}",
            event.start_date.format("%B %-d, %Y"),
            end.format("%B %-d, %Y")
        ),
        _ => event.start_date.format("%B %-d, %Y").to_string(),
    };

    let mut html = format!(
        "<h2>{}</h2>\n<p><strong>When:</strong> {}</p>\n",
        escape(&event.title),
        when
    );
    if let Some(ref location) = event.location {
        html.push_str(&format!("<p><strong>Where:</strong> {}</p>\n", escape(location)));
    }
    if let Some(description) = event.rendered_description() {
        html.push_str(&format!("<p>{}</p>\n", escape(&description).replace('\n', "<br>")));
    }
    html.push_str("<p>Open the attached invite.ics to add this event to your calendar.</p>\n");
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
