//! Conference records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WolfStreetError, WolfStreetResult};

/// Provenance tag written when a conference is linked to an internal
/// calendar event.
pub const CALENDAR_SOURCE_INTERNAL: &str = "internal";

/// A tracked industry event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Page the conference was ingested from, if any
    pub source_url: Option<String>,
    /// The calendar event mirroring this conference
    pub calendar_event_id: Option<String>,
    pub calendar_source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Conference {
    pub fn is_linked(&self) -> bool {
        self.calendar_event_id.is_some()
    }

    /// Apply a partial edit and re-check the date ordering.
    pub fn apply(&mut self, patch: &ConferencePatch) -> WolfStreetResult<()> {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(ref location) = patch.location {
            self.location = location.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = non_blank(description);
        }
        if let Some(ref tags) = patch.tags {
            self.tags = tags.clone();
        }
        if let Some(ref url) = patch.source_url {
            self.source_url = non_blank(url);
        }

        require_text("Conference name", &self.name)?;
        require_text("Location", &self.location)?;
        check_range(self.start_date, self.end_date)
    }
}

/// Fields of the new-conference form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConferenceDraft {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl ConferenceDraft {
    pub fn validate(&self) -> WolfStreetResult<()> {
        require_text("Conference name", &self.name)?;
        require_text("Location", &self.location)?;
        check_range(self.start_date, self.end_date)
    }
}

/// A partial conference edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConferencePatch {
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
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl ConferencePatch {
    /// Whether any field mirrored onto the calendar event changes.
    pub fn touches_calendar(&self) -> bool {
        self.name.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.location.is_some()
            || self.description.is_some()
    }
}

pub(crate) fn require_text(label: &str, value: &str) -> WolfStreetResult<()> {
    if value.trim().is_empty() {
        return Err(WolfStreetError::Validation(format!("{label} is required")));
    }
    Ok(())
}

pub(crate) fn check_range(start: NaiveDate, end: NaiveDate) -> WolfStreetResult<()> {
    if end < start {
        return Err(WolfStreetError::Validation(
            "End date cannot be before start date".into(),
        ));
    }
    Ok(())
}

pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ConferenceDraft {
        ConferenceDraft {
            name: "RSA Conference".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 4, 28).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            location: "San Francisco".into(),
            description: None,
            tags: vec![],
            source_url: None,
        }
    }

    #[test]
    fn draft_rejects_blank_name() {
        let mut d = draft();
        d.name = "  ".into();
        let err = d.validate().unwrap_err();
        assert!(matches!(err, WolfStreetError::Validation(_)));
    }

    #[test]
    fn draft_rejects_end_before_start() {
        let mut d = draft();
        d.end_date = NaiveDate::from_ymd_opt(2025, 4, 27).unwrap();
        let err = d.validate().unwrap_err();
        assert_eq!(err.to_string(), "End date cannot be before start date");
    }

    #[test]
    fn single_day_conference_is_valid() {
        let mut d = draft();
        d.end_date = d.start_date;
        assert!(d.validate().is_ok());
    }
}
