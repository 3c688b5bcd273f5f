use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::calendar_event::{CalendarEvent, CalendarEventPatch, EventType, NewCalendarEvent};
use crate::conference::non_blank;
use crate::error::{WolfStreetError, WolfStreetResult};
use crate::travel::TravelDays;

const COLUMNS: &str = "id, user_id, title, description, start_date, end_date, start_time, \
                       end_time, all_day, location, event_type, type_custom, color_hex, \
                       icon_name, invite_email, travel_before, travel_after, created_at";

/// Deterministic identity of a conference calendar event: the owner, the
/// title and the (travel-expanded) date range.
pub fn dedup_key(user_id: &str, title: &str, start: NaiveDate, end: NaiveDate) -> String {
    let start = start.to_string();
    let end = end.to_string();

    let mut hasher = Sha256::new();
    for part in [user_id, title.trim(), start.as_str(), end.as_str()] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

fn from_row(row: &Row) -> rusqlite::Result<CalendarEvent> {
    let event_type: String = row.get(10)?;

    Ok(CalendarEvent {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        start_time: row.get(6)?,
        end_time: row.get(7)?,
        all_day: row.get(8)?,
        location: row.get(9)?,
        event_type: EventType::parse(&event_type),
        type_custom: row.get(11)?,
        color_hex: row.get(12)?,
        icon_name: row.get(13)?,
        invite_email: row.get(14)?,
        travel: TravelDays {
            before: row.get(15)?,
            after: row.get(16)?,
        },
        created_at: row.get(17)?,
    })
}

/// Validate and insert an event. `dedup_key` is set for conference events
/// created by the linker.
pub(crate) fn insert(
    conn: &Connection,
    user_id: &str,
    new: &NewCalendarEvent,
    dedup_key: Option<&str>,
) -> WolfStreetResult<CalendarEvent> {
    new.validate()?;

    let (start_time, end_time) = if new.all_day {
        (None, None)
    } else {
        (new.start_time, new.end_time)
    };

    let event = CalendarEvent {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: new.title.trim().to_string(),
        description: new.description.as_deref().and_then(non_blank),
        start_date: new.start_date,
        end_date: new.end_date,
        start_time,
        end_time,
        all_day: new.all_day,
        location: new.location.as_deref().and_then(non_blank),
        event_type: new.event_type,
        type_custom: new.type_custom.as_deref().and_then(non_blank),
        color_hex: new.color_hex.as_deref().and_then(non_blank),
        icon_name: new.icon_name.as_deref().and_then(non_blank),
        invite_email: new.invite_email.as_deref().and_then(non_blank),
        travel: new.travel,
        created_at: Utc::now(),
    };

    conn.execute(
        &format!(
            "INSERT INTO calendar_events ({COLUMNS}, dedup_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ),
        params![
            event.id,
            event.user_id,
            event.title,
            event.description,
            event.start_date,
            event.end_date,
            event.start_time,
            event.end_time,
            event.all_day,
            event.location,
            event.event_type.as_str(),
            event.type_custom,
            event.color_hex,
            event.icon_name,
            event.invite_email,
            event.travel.before,
            event.travel.after,
            event.created_at,
            dedup_key,
        ],
    )?;

    Ok(event)
}

pub(crate) fn get(conn: &Connection, user_id: &str, id: &str) -> WolfStreetResult<CalendarEvent> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM calendar_events WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| WolfStreetError::not_found("Calendar event", id))
}

pub(crate) fn list(
    conn: &Connection,
    user_id: &str,
    from: Option<NaiveDate>,
) -> WolfStreetResult<Vec<CalendarEvent>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM calendar_events
         WHERE user_id = ?1 AND (?2 IS NULL OR start_date >= ?2)
         ORDER BY start_date ASC, start_time ASC, created_at ASC"
    ))?;
    let rows = stmt.query_map(params![user_id, from], from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Find an existing conference-typed event for the given identity: first by
/// `dedup_key`, then by the same title and range. Retyping an event drops its
/// key, so it never matches again.
pub(crate) fn find_conference_event(
    conn: &Connection,
    user_id: &str,
    title: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> WolfStreetResult<Option<CalendarEvent>> {
    let key = dedup_key(user_id, title, start, end);

    let found = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM calendar_events
                 WHERE user_id = ?1 AND event_type = 'conference'
                   AND (dedup_key = ?2
                        OR (title = ?3 AND start_date = ?4 AND end_date = ?5))
                 ORDER BY dedup_key = ?2 DESC, created_at ASC
                 LIMIT 1"
            ),
            params![user_id, key, title.trim(), start, end],
            from_row,
        )
        .optional()?;

    Ok(found)
}

/// Apply a partial edit. A row carrying a dedup key gets the key of its new
/// identity, unless another row already owns that key.
pub(crate) fn update(
    conn: &Connection,
    user_id: &str,
    id: &str,
    patch: &CalendarEventPatch,
) -> WolfStreetResult<CalendarEvent> {
    let mut event = get(conn, user_id, id)?;
    event.apply(patch)?;

    let key = dedup_key(user_id, &event.title, event.start_date, event.last_day());

    conn.execute(
        "UPDATE calendar_events SET
             title = ?3, description = ?4, start_date = ?5, end_date = ?6,
             start_time = ?7, end_time = ?8, all_day = ?9, location = ?10,
             event_type = ?11, type_custom = ?12, color_hex = ?13, icon_name = ?14,
             invite_email = ?15, travel_before = ?16, travel_after = ?17,
             dedup_key = CASE
                 WHEN dedup_key IS NULL OR ?11 <> 'conference' THEN NULL
                 WHEN EXISTS (SELECT 1 FROM calendar_events other
                              WHERE other.user_id = ?2 AND other.dedup_key = ?18
                                AND other.id <> ?1) THEN NULL
                 ELSE ?18
             END
         WHERE id = ?1 AND user_id = ?2",
        params![
            event.id,
            user_id,
            event.title,
            event.description,
            event.start_date,
            event.end_date,
            event.start_time,
            event.end_time,
            event.all_day,
            event.location,
            event.event_type.as_str(),
            event.type_custom,
            event.color_hex,
            event.icon_name,
            event.invite_email,
            event.travel.before,
            event.travel.after,
            key,
        ],
    )?;

    Ok(event)
}

pub(crate) fn delete(conn: &Connection, user_id: &str, id: &str) -> WolfStreetResult<()> {
    let deleted = conn.execute(
        "DELETE FROM calendar_events WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;

    if deleted == 0 {
        return Err(WolfStreetError::not_found("Calendar event", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn conference_event(title: &str) -> NewCalendarEvent {
        let mut new = NewCalendarEvent::all_day(title, date(2025, 6, 9), date(2025, 6, 14));
        new.event_type = EventType::Conference;
        new
    }

    #[test]
    fn dedup_key_is_stable_and_title_sensitive() {
        let a = dedup_key("u1", "Infosecurity Europe", date(2025, 6, 3), date(2025, 6, 5));
        let b = dedup_key("u1", " Infosecurity Europe ", date(2025, 6, 3), date(2025, 6, 5));
        let c = dedup_key("u1", "Infosecurity Asia", date(2025, 6, 3), date(2025, 6, 5));
        let d = dedup_key("u2", "Infosecurity Europe", date(2025, 6, 3), date(2025, 6, 5));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn duplicate_dedup_key_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        let key = dedup_key("u1", "Summit", date(2025, 6, 9), date(2025, 6, 14));

        store
            .transaction(|tx| insert(tx, "u1", &conference_event("Summit"), Some(key.as_str())))
            .unwrap();
        let second = store.transaction(|tx| insert(tx, "u1", &conference_event("Summit"), Some(key.as_str())));

        assert!(matches!(second, Err(WolfStreetError::Database(_))));
    }

    #[test]
    fn finds_conference_event_by_key_or_by_fields() {
        let store = Store::open_in_memory().unwrap();
        let manual = store
            .insert_calendar_event("u1", &conference_event("Summit"))
            .unwrap();

        let found = store
            .transaction(|tx| {
                find_conference_event(tx, "u1", "Summit", date(2025, 6, 9), date(2025, 6, 14))
            })
            .unwrap();
        assert_eq!(found.map(|e| e.id), Some(manual.id));

        let missing = store
            .transaction(|tx| {
                find_conference_event(tx, "u1", "Summit", date(2025, 6, 10), date(2025, 6, 14))
            })
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn meeting_with_same_fields_is_not_a_dedup_match() {
        let store = Store::open_in_memory().unwrap();
        let mut meeting = conference_event("Summit");
        meeting.event_type = EventType::Meeting;
        store.insert_calendar_event("u1", &meeting).unwrap();

        let found = store
            .transaction(|tx| {
                find_conference_event(tx, "u1", "Summit", date(2025, 6, 9), date(2025, 6, 14))
            })
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn retyped_event_loses_its_dedup_key() {
        let store = Store::open_in_memory().unwrap();
        let key = dedup_key("u1", "Summit", date(2025, 6, 9), date(2025, 6, 14));
        let created = store
            .transaction(|tx| insert(tx, "u1", &conference_event("Summit"), Some(key.as_str())))
            .unwrap();

        let patch = CalendarEventPatch {
            event_type: Some(EventType::Meeting),
            ..Default::default()
        };
        store.update_calendar_event("u1", &created.id, &patch).unwrap();

        let found = store
            .transaction(|tx| {
                find_conference_event(tx, "u1", "Summit", date(2025, 6, 9), date(2025, 6, 14))
            })
            .unwrap();
        assert!(found.is_none());

        // The key is free again for a fresh conference event.
        store
            .transaction(|tx| insert(tx, "u1", &conference_event("Summit"), Some(key.as_str())))
            .unwrap();
    }

    #[test]
    fn travel_round_trips_through_columns() {
        let store = Store::open_in_memory().unwrap();
        let mut new = conference_event("Summit");
        new.travel = TravelDays::new(1, 2);
        new.description = Some("Booth 7".into());

        let created = store.insert_calendar_event("u1", &new).unwrap();
        let loaded = store.get_calendar_event("u1", &created.id).unwrap();

        assert_eq!(loaded.travel, TravelDays::new(1, 2));
        assert_eq!(loaded.description.as_deref(), Some("Booth 7"));
        assert_eq!(loaded.event_type, EventType::Conference);
    }
}
