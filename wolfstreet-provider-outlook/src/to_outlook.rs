use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use wolfstreet_core::CalendarEvent;

const GRAPH_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Microsoft Graph `event` resource, limited to what we push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlookEvent {
    pub subject: String,
    pub body: ItemBody,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
    pub is_all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub display_name: String,
}

pub trait ToOutlook {
    fn to_outlook(&self) -> OutlookEvent;
}

impl ToOutlook for CalendarEvent {
    fn to_outlook(&self) -> OutlookEvent {
        let (start, end, is_all_day) = match self.start_time {
            Some(start_time) if !self.all_day => {
                let start = self.start_date.and_time(start_time);
                let end = match self.end_time {
                    Some(end_time) => self.last_day().and_time(end_time),
                    None => start + Duration::hours(1),
                };
                (start, end, false)
            }
            // Graph wants all-day events to run midnight to midnight, end exclusive
            _ => (
                self.start_date.and_hms_opt(0, 0, 0).unwrap_or_default(),
                (self.last_day() + Duration::days(1))
                    .and_hms_opt(0, 0, 0)
                    .unwrap_or_default(),
                true,
            ),
        };

        OutlookEvent {
            subject: self.title.clone(),
            body: ItemBody {
                content_type: "text".to_string(),
                content: self.rendered_description().unwrap_or_default(),
            },
            start: utc(start),
            end: utc(end),
            is_all_day,
            location: self.location.as_ref().map(|l| Location {
                display_name: l.clone(),
            }),
        }
    }
}

fn utc(dt: NaiveDateTime) -> DateTimeTimeZone {
    DateTimeTimeZone {
        date_time: dt.format(GRAPH_DATETIME_FORMAT).to_string(),
        time_zone: "UTC".to_string(),
    }
}
