//! Conference-from-URL ingestion.
//!
//! The parsing service is an external collaborator. This module holds its
//! wire types, turns a reply into an explicit [`ParseResult`], and saves
//! confirmed fields through the linker.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::conference::{ConferenceDraft, ConferencePatch, non_blank};
use crate::error::{WolfStreetError, WolfStreetResult};
use crate::linker::{EditOutcome, Linker};
use crate::store::Store;
use crate::travel::TravelDays;

/// Marker the service sets in `raw.error` when it could not fetch the page
/// and returned a name-only stub.
pub const FETCH_FAILED: &str = "fetch_failed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    #[serde(default)]
    pub conference: Option<IngestedConference>,
    #[serde(default)]
    pub raw: Option<RawDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestedConference {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub registration_url: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDetails {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Dates the service could not resolve come back as `""` or free text;
/// those read as missing.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

/// Conference fields shown to the user for confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConferenceFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub registration_url: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
}

impl From<IngestedConference> for ConferenceFields {
    fn from(c: IngestedConference) -> Self {
        ConferenceFields {
            name: c.name.as_deref().and_then(non_blank),
            start_date: c.start_date,
            end_date: c.end_date,
            location: c.location.as_deref().and_then(non_blank),
            description: c.short_description.as_deref().and_then(non_blank),
            tags: c.tags,
            registration_url: c.registration_url.as_deref().and_then(non_blank),
            venue: c.venue.as_deref().and_then(non_blank),
        }
    }
}

impl ConferenceFields {
    /// Names of required fields that are still empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.start_date.is_none() {
            missing.push("start_date");
        }
        if self.end_date.is_none() {
            missing.push("end_date");
        }
        if self.location.is_none() && self.venue.is_none() {
            missing.push("location");
        }
        missing
    }

    /// Turn confirmed fields into a conference draft. Falls back to the
    /// venue when no location was parsed.
    pub fn into_draft(self, source_url: &str) -> WolfStreetResult<ConferenceDraft> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(WolfStreetError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let (Some(name), Some(start_date), Some(end_date), Some(location)) =
            (self.name, self.start_date, self.end_date, self.location.or(self.venue))
        else {
            return Err(WolfStreetError::Validation("Missing required fields".into()));
        };

        let draft = ConferenceDraft {
            name,
            start_date,
            end_date,
            location,
            description: self.description,
            tags: self.tags,
            source_url: non_blank(source_url),
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// What the ingestion service made of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "fields", rename_all = "snake_case")]
pub enum ParseResult {
    /// Full parse, ready for confirmation
    Parsed(ConferenceFields),
    /// Page could not be fetched; only URL-derived fields are present
    FallbackStub(ConferenceFields),
    /// Nothing usable came back
    Failed(String),
}

impl ParseResult {
    pub fn from_response(response: IngestResponse) -> Self {
        let raw = response.raw.unwrap_or_default();

        if !response.success {
            let reason = raw
                .details
                .or(raw.error)
                .unwrap_or_else(|| "Ingestion service reported a failure".to_string());
            return ParseResult::Failed(reason);
        }

        let Some(conference) = response.conference else {
            return ParseResult::Failed("Ingestion service returned no conference".into());
        };

        let fields = ConferenceFields::from(conference);
        if raw.error.as_deref() == Some(FETCH_FAILED) {
            ParseResult::FallbackStub(fields)
        } else {
            ParseResult::Parsed(fields)
        }
    }

    pub fn fields(&self) -> Option<&ConferenceFields> {
        match self {
            ParseResult::Parsed(fields) | ParseResult::FallbackStub(fields) => Some(fields),
            ParseResult::Failed(_) => None,
        }
    }
}

/// Save confirmed ingestion fields: create a conference (or update
/// `conference_id`) and make sure it has an up-to-date calendar event.
pub fn save_ingested(
    store: &Store,
    user_id: &str,
    conference_id: Option<&str>,
    fields: ConferenceFields,
    source_url: &str,
    travel: Option<TravelDays>,
) -> WolfStreetResult<EditOutcome> {
    let draft = fields.into_draft(source_url)?;
    let linker = Linker::new(store, user_id);

    let outcome = match conference_id {
        None => {
            let created = linker.create_conference(&draft, travel)?;
            EditOutcome {
                conference: created.conference,
                calendar_warning: created.calendar_warning,
            }
        }
        Some(id) => {
            let patch = ConferencePatch {
                name: Some(draft.name),
                start_date: Some(draft.start_date),
                end_date: Some(draft.end_date),
                location: Some(draft.location),
                description: Some(draft.description.unwrap_or_default()),
                tags: Some(draft.tags),
                source_url: draft.source_url,
            };
            let edited = linker.edit_conference(id, &patch, travel)?;

            if edited.conference.is_linked() || edited.calendar_warning.is_some() {
                edited
            } else {
                let calendar_warning = linker
                    .create_calendar_event_for_conference(id, travel)
                    .err()
                    .map(|e| format!("Conference saved, but calendar sync failed: {e}"));
                EditOutcome {
                    conference: store.get_conference(user_id, id)?,
                    calendar_warning,
                }
            }
        }
    };

    info!(conference_id = %outcome.conference.id, source_url, "ingested conference saved");
    Ok(outcome)
}
