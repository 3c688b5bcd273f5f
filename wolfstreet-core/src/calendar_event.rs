//! Internal calendar events.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::conference::{check_range, non_blank, require_text};
use crate::error::{WolfStreetError, WolfStreetResult};
use crate::travel::TravelDays;

/// Kind of calendar entry. Stored as lowercase text; anything unknown is
/// treated as `Custom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    #[default]
    Meeting,
    Deadline,
    Conference,
    Travel,
    Reminder,
    Webinar,
    Custom,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Meeting => "meeting",
            EventType::Deadline => "deadline",
            EventType::Conference => "conference",
            EventType::Travel => "travel",
            EventType::Reminder => "reminder",
            EventType::Webinar => "webinar",
            EventType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "meeting" => EventType::Meeting,
            "deadline" => EventType::Deadline,
            "conference" => EventType::Conference,
            "travel" => EventType::Travel,
            "reminder" => EventType::Reminder,
            "webinar" => EventType::Webinar,
            _ => EventType::Custom,
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            EventType::Meeting => "#3b82f6",
            EventType::Deadline => "#ef4444",
            EventType::Conference => "#8b5cf6",
            EventType::Travel => "#10b981",
            EventType::Reminder => "#f59e0b",
            EventType::Webinar => "#06b6d4",
            EventType::Custom => "#6b7280",
        }
    }

    pub fn default_icon(&self) -> &'static str {
        match self {
            EventType::Meeting => "users",
            EventType::Deadline => "alarm-clock",
            EventType::Conference => "presentation",
            EventType::Travel => "plane",
            EventType::Reminder => "bell",
            EventType::Webinar => "video",
            EventType::Custom => "calendar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Meeting => "Meeting",
            EventType::Deadline => "Deadline",
            EventType::Conference => "Conference",
            EventType::Travel => "Travel",
            EventType::Reminder => "Reminder",
            EventType::Webinar => "Webinar",
            EventType::Custom => "Custom",
        }
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        EventType::parse(&s)
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dated entry in the user's internal calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub all_day: bool,
    pub location: Option<String>,
    pub event_type: EventType,
    /// Overrides the event type label when set
    pub type_custom: Option<String>,
    pub color_hex: Option<String>,
    pub icon_name: Option<String>,
    /// Recipient for e-mailed invites
    pub invite_email: Option<String>,
    #[serde(default)]
    pub travel: TravelDays,
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    /// Last inclusive day of the event.
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    /// Explicit color wins over the type default.
    pub fn color(&self) -> &str {
        self.color_hex
            .as_deref()
            .unwrap_or_else(|| self.event_type.default_color())
    }

    /// Explicit icon wins over the type default.
    pub fn icon(&self) -> &str {
        self.icon_name
            .as_deref()
            .unwrap_or_else(|| self.event_type.default_icon())
    }

    pub fn type_label(&self) -> &str {
        self.type_custom
            .as_deref()
            .unwrap_or_else(|| self.event_type.label())
    }

    /// Description as shown to people: the travel summary (if any) followed
    /// by the stored description.
    pub fn rendered_description(&self) -> Option<String> {
        // A padded event shortened by hand can contract to an inverted range.
        let summary = match self.travel.contract(self.start_date, self.last_day()) {
            Ok((start, end)) if start <= end => self.travel.summary(start, end),
            _ => None,
        };

        match (summary, self.description.as_deref()) {
            (Some(summary), Some(desc)) => Some(format!("{summary}\n\n{desc}")),
            (Some(summary), None) => Some(summary),
            (None, Some(desc)) => Some(desc.to_string()),
            (None, None) => None,
        }
    }

    /// Apply a partial edit and re-validate.
    pub fn apply(&mut self, patch: &CalendarEventPatch) -> WolfStreetResult<()> {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = non_blank(description);
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = Some(end);
        }
        if let Some(time) = patch.start_time {
            self.start_time = Some(time);
        }
        if let Some(time) = patch.end_time {
            self.end_time = Some(time);
        }
        if let Some(all_day) = patch.all_day {
            self.all_day = all_day;
            if all_day {
                self.start_time = None;
                self.end_time = None;
            }
        }
        if let Some(ref location) = patch.location {
            self.location = non_blank(location);
        }
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        if let Some(ref label) = patch.type_custom {
            self.type_custom = non_blank(label);
        }
        if let Some(ref color) = patch.color_hex {
            self.color_hex = non_blank(color);
        }
        if let Some(ref icon) = patch.icon_name {
            self.icon_name = non_blank(icon);
        }
        if let Some(ref email) = patch.invite_email {
            self.invite_email = non_blank(email);
        }
        if let Some(travel) = patch.travel {
            travel.validate()?;
            self.travel = travel;
        }

        validate_schedule(
            &self.title,
            self.start_date,
            self.end_date,
            self.start_time,
            self.end_time,
        )
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Fields of the new-event form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCalendarEvent {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default = "default_all_day")]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub type_custom: Option<String>,
    #[serde(default)]
    pub color_hex: Option<String>,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default)]
    pub invite_email: Option<String>,
    #[serde(default)]
    pub travel: TravelDays,
}

fn default_all_day() -> bool {
    true
}

impl NewCalendarEvent {
    /// An all-day entry with everything else defaulted.
    pub fn all_day(title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        NewCalendarEvent {
            title: title.into(),
            description: None,
            start_date: start,
            end_date: Some(end),
            start_time: None,
            end_time: None,
            all_day: true,
            location: None,
            event_type: EventType::default(),
            type_custom: None,
            color_hex: None,
            icon_name: None,
            invite_email: None,
            travel: TravelDays::default(),
        }
    }

    pub fn validate(&self) -> WolfStreetResult<()> {
        self.travel.validate()?;
        validate_schedule(
            &self.title,
            self.start_date,
            self.end_date,
            self.start_time,
            self.end_time,
        )
    }
}

/// A partial calendar event edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarEventPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub all_day: Option<bool>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub event_type: Option<EventType>,
    #[serde(default)]
    pub type_custom: Option<String>,
    #[serde(default)]
    pub color_hex: Option<String>,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default)]
    pub invite_email: Option<String>,
    #[serde(default)]
    pub travel: Option<TravelDays>,
}

fn validate_schedule(
    title: &str,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
) -> WolfStreetResult<()> {
    require_text("Title", title)?;

    if let Some(end) = end_date {
        check_range(start_date, end)?;
    }

    let single_day = end_date.is_none_or(|end| end == start_date);
    if let (true, Some(start), Some(end)) = (single_day, start_time, end_time) {
        if end < start {
            return Err(WolfStreetError::Validation(
                "End time cannot be before start time".into(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_type: EventType) -> CalendarEvent {
        CalendarEvent {
            id: "evt-1".into(),
            user_id: "user-1".into(),
            title: "Black Hat USA".into(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2025, 8, 2).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 8, 7).unwrap()),
            start_time: None,
            end_time: None,
            all_day: true,
            location: None,
            event_type,
            type_custom: None,
            color_hex: None,
            icon_name: None,
            invite_email: None,
            travel: TravelDays::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_event_type_parses_as_custom() {
        assert_eq!(EventType::parse("Conference"), EventType::Conference);
        assert_eq!(EventType::parse("offsite"), EventType::Custom);

        let parsed: EventType = serde_json::from_str("\"webinar\"").unwrap();
        assert_eq!(parsed, EventType::Webinar);
        assert_eq!(serde_json::to_string(&EventType::Travel).unwrap(), "\"travel\"");
    }

    #[test]
    fn explicit_styling_wins_over_type_defaults() {
        let mut e = event(EventType::Conference);
        assert_eq!(e.color(), "#8b5cf6");
        assert_eq!(e.icon(), "presentation");

        e.color_hex = Some("#000000".into());
        e.icon_name = Some("star".into());
        e.type_custom = Some("Trade show".into());
        assert_eq!(e.color(), "#000000");
        assert_eq!(e.icon(), "star");
        assert_eq!(e.type_label(), "Trade show");
    }

    #[test]
    fn rendered_description_derives_travel_summary() {
        let mut e = event(EventType::Conference);
        e.start_date = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        e.end_date = Some(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        e.travel = TravelDays::new(1, 2);
        e.description = Some("Booth 42".into());

        let rendered = e.rendered_description().unwrap();
        assert!(rendered.starts_with("✈️ Travel: Jun 9, 2025\n📍 Conference: Jun 10, 2025 - Jun 12, 2025"));
        assert!(rendered.ends_with("\n\nBooth 42"));
    }

    #[test]
    fn patch_rejects_end_time_before_start_time() {
        let mut e = event(EventType::Meeting);
        e.end_date = None;
        let patch = CalendarEventPatch {
            all_day: Some(false),
            start_time: NaiveTime::from_hms_opt(14, 0, 0),
            end_time: NaiveTime::from_hms_opt(13, 0, 0),
            ..Default::default()
        };
        assert!(matches!(e.apply(&patch), Err(WolfStreetError::Validation(_))));
    }

    #[test]
    fn shortened_padded_event_keeps_only_its_description() {
        let mut e = event(EventType::Conference);
        e.start_date = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        e.end_date = Some(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        e.travel = TravelDays::new(2, 2);
        e.description = Some("Booth 42".into());

        assert_eq!(e.rendered_description().as_deref(), Some("Booth 42"));
    }

    #[test]
    fn patch_rejects_oversized_travel() {
        let mut e = event(EventType::Conference);
        let patch = CalendarEventPatch {
            travel: Some(TravelDays::new(0, u32::MAX)),
            ..Default::default()
        };
        assert!(matches!(e.apply(&patch), Err(WolfStreetError::Validation(_))));
        assert_eq!(e.travel, TravelDays::default());
    }
}
