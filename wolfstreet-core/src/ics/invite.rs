//! Single-event invite calendars.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::calendar_event::CalendarEvent;
use crate::error::{WolfStreetError, WolfStreetResult};

/// Attachment name used when the invite is e-mailed.
pub const INVITE_FILENAME: &str = "invite.ics";

const PRODID: &str = "-//Wolf Street//CRM//EN";

/// When an invite starts or ends.
enum InviteTime {
    Date(NaiveDate),
    DateTimeUtc(NaiveDateTime),
}

/// Generate a publishable calendar holding one event.
///
/// All-day (or time-less) events get `VALUE=DATE` with an exclusive end one
/// day after the last day. Timed events are written in UTC and last one hour
/// unless an end time is set.
pub fn generate_invite(
    event: &CalendarEvent,
    app_domain: &str,
    dtstamp: DateTime<Utc>,
) -> WolfStreetResult<String> {
    if app_domain.trim().is_empty() {
        return Err(WolfStreetError::IcsGenerate(
            "app domain is required for invite UIDs".into(),
        ));
    }

    let (start, end) = invite_times(event);

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@{}", event.id, app_domain.trim()));
    ics_event.add_property("DTSTAMP", dtstamp.format("%Y%m%dT%H%M%SZ").to_string());
    add_time_property(&mut ics_event, "DTSTART", &start);
    add_time_property(&mut ics_event, "DTEND", &end);
    ics_event.summary(&event.title);

    if let Some(ref desc) = event.rendered_description() {
        ics_event.description(desc);
    }

    if let Some(ref loc) = event.location {
        ics_event.location(loc);
    }

    let mut cal = Calendar::new();
    cal.push(ics_event.done());
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

fn invite_times(event: &CalendarEvent) -> (InviteTime, InviteTime) {
    match event.start_time {
        Some(start_time) if !event.all_day => {
            let start = event.start_date.and_time(start_time);
            let end = match event.end_time {
                Some(end_time) => event.last_day().and_time(end_time),
                None => start + Duration::hours(1),
            };
            (InviteTime::DateTimeUtc(start), InviteTime::DateTimeUtc(end))
        }
        _ => (
            InviteTime::Date(event.start_date),
            InviteTime::Date(event.last_day() + Duration::days(1)),
        ),
    }
}

fn add_time_property(ics_event: &mut icalendar::Event, name: &str, time: &InviteTime) {
    match time {
        InviteTime::Date(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        InviteTime::DateTimeUtc(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%SZ").to_string());
        }
    }
}

/// Replace the crate's PRODID with ours, declare `METHOD:PUBLISH` and drop
/// the default `CALSCALE`.
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len() + 16);

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str(&format!("PRODID:{PRODID}\r\n"));
            result.push_str("METHOD:PUBLISH\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar_event::EventType;
    use crate::travel::TravelDays;
    use chrono::{NaiveTime, TimeZone};

    fn event(start: NaiveDate, end: Option<NaiveDate>) -> CalendarEvent {
        CalendarEvent {
            id: "0b6a6c1e".into(),
            user_id: "user-1".into(),
            title: "Partner Summit".into(),
            description: None,
            start_date: start,
            end_date: end,
            start_time: None,
            end_time: None,
            all_day: true,
            location: Some("Austin".into()),
            event_type: EventType::Conference,
            type_custom: None,
            color_hex: None,
            icon_name: None,
            invite_email: None,
            travel: TravelDays::default(),
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn all_day_event_has_exclusive_date_end() {
        let ics = generate_invite(
            &event(date(2025, 3, 1), Some(date(2025, 3, 3))),
            "wolfstreet.app",
            stamp(),
        )
        .unwrap();

        assert!(ics.contains("DTSTART;VALUE=DATE:20250301\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20250304\r\n"));
        assert!(ics.contains("UID:0b6a6c1e@wolfstreet.app\r\n"));
        assert!(ics.contains("DTSTAMP:20250201T093000Z\r\n"));
        assert!(ics.contains("SUMMARY:Partner Summit\r\n"));
        assert!(ics.contains("LOCATION:Austin\r\n"));
    }

    #[test]
    fn single_day_event_ends_next_day() {
        let ics = generate_invite(&event(date(2025, 12, 31), None), "wolfstreet.app", stamp()).unwrap();

        assert!(ics.contains("DTSTART;VALUE=DATE:20251231\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20260101\r\n"));
    }

    #[test]
    fn timed_event_defaults_to_one_hour() {
        let mut e = event(date(2025, 3, 1), None);
        e.all_day = false;
        e.start_time = NaiveTime::from_hms_opt(23, 30, 0);

        let ics = generate_invite(&e, "wolfstreet.app", stamp()).unwrap();
        assert!(ics.contains("DTSTART:20250301T233000Z\r\n"));
        assert!(ics.contains("DTEND:20250302T003000Z\r\n"));
    }

    #[test]
    fn timed_event_uses_explicit_end() {
        let mut e = event(date(2025, 3, 1), None);
        e.all_day = false;
        e.start_time = NaiveTime::from_hms_opt(9, 0, 0);
        e.end_time = NaiveTime::from_hms_opt(10, 15, 0);

        let ics = generate_invite(&e, "wolfstreet.app", stamp()).unwrap();
        assert!(ics.contains("DTEND:20250301T101500Z\r\n"));
    }

    #[test]
    fn header_is_publishable_without_calscale() {
        let ics = generate_invite(&event(date(2025, 3, 1), None), "wolfstreet.app", stamp()).unwrap();

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("PRODID:-//Wolf Street//CRM//EN\r\nMETHOD:PUBLISH\r\n"));
        assert!(!ics.contains("CALSCALE"));
        assert!(ics.trim_end().ends_with("END:VCALENDAR"));
    }

    #[test]
    fn missing_domain_is_rejected() {
        let err = generate_invite(&event(date(2025, 3, 1), None), " ", stamp()).unwrap_err();
        assert!(matches!(err, WolfStreetError::IcsGenerate(_)));
    }
}
