use std::collections::HashSet;

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::conference::{Conference, ConferenceDraft, ConferencePatch, non_blank};
use crate::error::{WolfStreetError, WolfStreetResult};

const COLUMNS: &str = "id, user_id, name, start_date, end_date, location, description, tags, \
                       source_url, calendar_event_id, calendar_source, created_at";

fn from_row(row: &Row) -> rusqlite::Result<Conference> {
    let tags: String = row.get(7)?;
    let tags = serde_json::from_str(&tags)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(Conference {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        location: row.get(5)?,
        description: row.get(6)?,
        tags,
        source_url: row.get(8)?,
        calendar_event_id: row.get(9)?,
        calendar_source: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Validate and insert an unlinked conference.
pub(crate) fn insert(
    conn: &Connection,
    user_id: &str,
    draft: &ConferenceDraft,
) -> WolfStreetResult<Conference> {
    insert_linked(conn, user_id, draft, None)
}

/// Validate and insert a conference, optionally already linked to a calendar
/// event as `(calendar_event_id, calendar_source)`.
pub(crate) fn insert_linked(
    conn: &Connection,
    user_id: &str,
    draft: &ConferenceDraft,
    link: Option<(&str, &str)>,
) -> WolfStreetResult<Conference> {
    draft.validate()?;

    let conference = Conference {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: draft.name.trim().to_string(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        location: draft.location.trim().to_string(),
        description: draft.description.as_deref().and_then(non_blank),
        tags: draft.tags.clone(),
        source_url: draft.source_url.as_deref().and_then(non_blank),
        calendar_event_id: link.map(|(id, _)| id.to_string()),
        calendar_source: link.map(|(_, source)| source.to_string()),
        created_at: Utc::now(),
    };

    conn.execute(
        &format!("INSERT INTO conferences ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"),
        params![
            conference.id,
            conference.user_id,
            conference.name,
            conference.start_date,
            conference.end_date,
            conference.location,
            conference.description,
            serde_json::to_string(&conference.tags)?,
            conference.source_url,
            conference.calendar_event_id,
            conference.calendar_source,
            conference.created_at,
        ],
    )?;

    Ok(conference)
}

pub(crate) fn get(conn: &Connection, user_id: &str, id: &str) -> WolfStreetResult<Conference> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM conferences WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| WolfStreetError::not_found("Conference", id))
}

/// The conference linked to a calendar event, if any.
pub(crate) fn linked_to(
    conn: &Connection,
    user_id: &str,
    calendar_event_id: &str,
) -> WolfStreetResult<Option<Conference>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM conferences
                 WHERE user_id = ?1 AND calendar_event_id = ?2
                 ORDER BY created_at ASC LIMIT 1"
            ),
            params![user_id, calendar_event_id],
            from_row,
        )
        .optional()?)
}

/// All of the user's conferences, earliest first.
pub(crate) fn list(conn: &Connection, user_id: &str) -> WolfStreetResult<Vec<Conference>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM conferences WHERE user_id = ?1
         ORDER BY start_date ASC, created_at ASC"
    ))?;
    let rows = stmt.query_map(params![user_id], from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Apply a partial edit. Validation runs against the merged record.
pub(crate) fn update(
    conn: &Connection,
    user_id: &str,
    id: &str,
    patch: &ConferencePatch,
) -> WolfStreetResult<Conference> {
    let mut conference = get(conn, user_id, id)?;
    conference.apply(patch)?;

    conn.execute(
        "UPDATE conferences SET
             name = ?3, start_date = ?4, end_date = ?5, location = ?6,
             description = ?7, tags = ?8, source_url = ?9
         WHERE id = ?1 AND user_id = ?2",
        params![
            conference.id,
            user_id,
            conference.name,
            conference.start_date,
            conference.end_date,
            conference.location,
            conference.description,
            serde_json::to_string(&conference.tags)?,
            conference.source_url,
        ],
    )?;

    Ok(conference)
}

/// Point a conference at a calendar event.
pub(crate) fn set_link(
    conn: &Connection,
    user_id: &str,
    id: &str,
    calendar_event_id: &str,
    calendar_source: &str,
) -> WolfStreetResult<()> {
    let changed = conn.execute(
        "UPDATE conferences SET calendar_event_id = ?3, calendar_source = ?4
         WHERE id = ?1 AND user_id = ?2",
        params![id, user_id, calendar_event_id, calendar_source],
    )?;

    if changed == 0 {
        return Err(WolfStreetError::not_found("Conference", id));
    }
    Ok(())
}

/// Unlink every conference of the user that points at `calendar_event_id`.
pub(crate) fn clear_links_to(
    conn: &Connection,
    user_id: &str,
    calendar_event_id: &str,
) -> WolfStreetResult<usize> {
    Ok(conn.execute(
        "UPDATE conferences SET calendar_event_id = NULL, calendar_source = NULL
         WHERE user_id = ?1 AND calendar_event_id = ?2",
        params![user_id, calendar_event_id],
    )?)
}

/// Calendar event ids already claimed by one of the user's conferences.
pub(crate) fn linked_calendar_event_ids(
    conn: &Connection,
    user_id: &str,
) -> WolfStreetResult<HashSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT calendar_event_id FROM conferences
         WHERE user_id = ?1 AND calendar_event_id IS NOT NULL",
    )?;
    let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<Result<HashSet<_>, _>>()?)
}
