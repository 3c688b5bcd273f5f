//! Promote existing calendar events that look like conferences into
//! conference records.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::calendar_event::{CalendarEvent, EventType};
use crate::conference::{CALENDAR_SOURCE_INTERNAL, Conference, ConferenceDraft};
use crate::error::{WolfStreetError, WolfStreetResult};
use crate::linker::VIEW_CONFERENCES;
use crate::store::{Store, calendar_events, conferences};

/// How far back the import looks for candidate events.
pub const IMPORT_LOOKBACK_DAYS: i64 = 30;

/// Title fragments (case-insensitive) that mark an event as conference-like.
pub const CONFERENCE_KEYWORDS: &[&str] = &[
    "conference",
    "summit",
    "expo",
    "symposium",
    "convention",
    "i/itsec",
    "itsec",
    "workshop",
    "forum",
    "seminar",
];

/// Location used when the imported event has none.
const DEFAULT_LOCATION: &str = "TBD";

pub fn is_conference_like(event: &CalendarEvent) -> bool {
    if event.event_type == EventType::Conference {
        return true;
    }
    let title = event.title.to_lowercase();
    CONFERENCE_KEYWORDS.iter().any(|k| title.contains(k))
}

fn candidates(
    events: Vec<CalendarEvent>,
    linked: &HashSet<String>,
) -> Vec<CalendarEvent> {
    events
        .into_iter()
        .filter(|e| is_conference_like(e) && !linked.contains(&e.id))
        .collect()
}

fn lookback_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(IMPORT_LOOKBACK_DAYS)
}

/// Conference-like events from the lookback window onward that no
/// conference links to yet, earliest first.
pub fn import_candidates(
    store: &Store,
    user_id: &str,
    today: NaiveDate,
) -> WolfStreetResult<Vec<CalendarEvent>> {
    store.transaction(|tx| {
        let events = calendar_events::list(tx, user_id, Some(lookback_start(today)))?;
        let linked = conferences::linked_calendar_event_ids(tx, user_id)?;
        Ok(candidates(events, &linked))
    })
}

/// Create one linked conference per selected candidate. All or nothing: an
/// id that is not a current candidate fails the whole batch.
pub fn import_selected(
    store: &Store,
    user_id: &str,
    today: NaiveDate,
    selected: &[String],
) -> WolfStreetResult<Vec<Conference>> {
    let imported = store.transaction(|tx| {
        let events = calendar_events::list(tx, user_id, Some(lookback_start(today)))?;
        let linked = conferences::linked_calendar_event_ids(tx, user_id)?;
        let candidates = candidates(events, &linked);

        let mut seen = HashSet::new();
        let mut imported = Vec::with_capacity(selected.len());

        for id in selected.iter().filter(|id| seen.insert(id.as_str())) {
            let event = candidates.iter().find(|e| &e.id == id).ok_or_else(|| {
                WolfStreetError::Validation(format!("Calendar event {id} is not available for import"))
            })?;

            let draft = draft_from_event(event);
            imported.push(conferences::insert_linked(
                tx,
                user_id,
                &draft,
                Some((event.id.as_str(), CALENDAR_SOURCE_INTERNAL)),
            )?);
        }

        Ok(imported)
    })?;

    info!(user_id, count = imported.len(), views = VIEW_CONFERENCES, "calendar events imported");
    Ok(imported)
}

fn draft_from_event(event: &CalendarEvent) -> ConferenceDraft {
    ConferenceDraft {
        name: event.title.clone(),
        start_date: event.start_date,
        end_date: event.last_day(),
        location: event
            .location
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        description: event.description.clone(),
        tags: Vec::new(),
        source_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar_event::NewCalendarEvent;

    const USER: &str = "user-1";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 5, 1)
    }

    fn add(store: &Store, title: &str, event_type: EventType, start: NaiveDate) -> CalendarEvent {
        let mut new = NewCalendarEvent::all_day(title, start, start);
        new.event_type = event_type;
        store.insert_calendar_event(USER, &new).unwrap()
    }

    fn titles(events: &[CalendarEvent]) -> Vec<&str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn keyword_and_type_decide_candidates() {
        let store = Store::open_in_memory().unwrap();
        add(&store, "Annual Tech Summit 2025", EventType::Meeting, date(2025, 6, 1));
        add(&store, "Team Sync", EventType::Meeting, date(2025, 6, 2));
        add(&store, "Team Sync", EventType::Conference, date(2025, 6, 3));
        add(&store, "I/ITSEC prep", EventType::Reminder, date(2025, 6, 4));

        let found = import_candidates(&store, USER, today()).unwrap();
        assert_eq!(
            titles(&found),
            vec!["Annual Tech Summit 2025", "Team Sync", "I/ITSEC prep"]
        );
        assert!(found.iter().all(|e| e.start_date != date(2025, 6, 2)));
    }

    #[test]
    fn lookback_window_is_thirty_days() {
        let store = Store::open_in_memory().unwrap();
        add(&store, "Old Expo", EventType::Meeting, date(2025, 3, 31));
        add(&store, "Recent Expo", EventType::Meeting, date(2025, 4, 1));

        let found = import_candidates(&store, USER, today()).unwrap();
        assert_eq!(titles(&found), vec!["Recent Expo"]);
    }

    #[test]
    fn linked_events_are_never_candidates() {
        let store = Store::open_in_memory().unwrap();
        let event = add(&store, "Security Forum", EventType::Conference, date(2025, 6, 1));
        let draft = draft_from_event(&event);
        let conference = store.insert_conference(USER, &draft).unwrap();
        store
            .set_conference_link(USER, &conference.id, &event.id, CALENDAR_SOURCE_INTERNAL)
            .unwrap();

        assert!(import_candidates(&store, USER, today()).unwrap().is_empty());
    }

    #[test]
    fn import_creates_linked_conferences() {
        let store = Store::open_in_memory().unwrap();
        let event = add(&store, "Defense Symposium", EventType::Meeting, date(2025, 6, 1));

        let imported = import_selected(&store, USER, today(), &[event.id.clone()]).unwrap();
        assert_eq!(imported.len(), 1);

        let conference = &imported[0];
        assert_eq!(conference.name, "Defense Symposium");
        assert_eq!(conference.location, "TBD");
        assert_eq!(conference.end_date, date(2025, 6, 1));
        assert_eq!(conference.calendar_event_id.as_deref(), Some(event.id.as_str()));
        assert_eq!(conference.calendar_source.as_deref(), Some("internal"));

        assert!(import_candidates(&store, USER, today()).unwrap().is_empty());
    }

    #[test]
    fn unknown_selection_fails_whole_batch() {
        let store = Store::open_in_memory().unwrap();
        let event = add(&store, "Defense Symposium", EventType::Meeting, date(2025, 6, 1));
        let meeting = add(&store, "Team Sync", EventType::Meeting, date(2025, 6, 2));

        let err = import_selected(&store, USER, today(), &[event.id.clone(), meeting.id.clone()])
            .unwrap_err();
        assert!(matches!(err, WolfStreetError::Validation(_)));
        assert!(store.list_conferences(USER).unwrap().is_empty());
    }
}
