//! SQLite-backed relational store.
//!
//! Row access lives in the per-table submodules as free functions over a
//! `&Connection`, so multi-step workflows (the linker, bulk import) can run
//! them inside a single transaction. The `Store` methods are thin wrappers
//! for single-statement callers.

pub mod calendar_events;
pub mod conferences;
pub mod profiles;

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};
use tracing::info;

use crate::calendar_event::{CalendarEvent, CalendarEventPatch, NewCalendarEvent};
use crate::conference::{Conference, ConferenceDraft, ConferencePatch};
use crate::error::WolfStreetResult;
use crate::session::Profile;

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (creating if needed) the database file and apply the schema.
    pub fn open(path: &Path) -> WolfStreetResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = Store {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.migrate()?;

        info!(db_path = %path.display(), "store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> WolfStreetResult<Self> {
        let store = Store {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Ensure the full schema exists.
    pub fn migrate(&self) -> WolfStreetResult<()> {
        self.conn.lock().execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Run `f` inside one transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Transaction) -> WolfStreetResult<T>,
    ) -> WolfStreetResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> WolfStreetResult<T>) -> WolfStreetResult<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    // PROFILES:

    pub fn upsert_profile(
        &self,
        user_id: &str,
        email: &str,
        full_name: Option<&str>,
    ) -> WolfStreetResult<Profile> {
        self.with_conn(|c| profiles::upsert(c, user_id, email, full_name))
    }

    pub fn get_profile(&self, user_id: &str) -> WolfStreetResult<Profile> {
        self.with_conn(|c| profiles::get(c, user_id))
    }

    pub fn list_profiles(&self) -> WolfStreetResult<Vec<Profile>> {
        self.with_conn(profiles::list)
    }

    pub fn set_approval(&self, user_id: &str, approved: bool) -> WolfStreetResult<Profile> {
        self.with_conn(|c| profiles::set_flag(c, user_id, profiles::Flag::Approved, approved))
    }

    pub fn set_admin(&self, user_id: &str, admin: bool) -> WolfStreetResult<Profile> {
        self.with_conn(|c| profiles::set_flag(c, user_id, profiles::Flag::Admin, admin))
    }

    // CONFERENCES:

    pub fn insert_conference(
        &self,
        user_id: &str,
        draft: &ConferenceDraft,
    ) -> WolfStreetResult<Conference> {
        self.with_conn(|c| conferences::insert(c, user_id, draft))
    }

    /// Insert several conferences as one all-or-nothing batch.
    pub fn insert_conferences(
        &self,
        user_id: &str,
        drafts: &[ConferenceDraft],
    ) -> WolfStreetResult<Vec<Conference>> {
        self.transaction(|tx| {
            drafts
                .iter()
                .map(|d| conferences::insert(tx, user_id, d))
                .collect()
        })
    }

    pub fn get_conference(&self, user_id: &str, id: &str) -> WolfStreetResult<Conference> {
        self.with_conn(|c| conferences::get(c, user_id, id))
    }

    pub fn list_conferences(&self, user_id: &str) -> WolfStreetResult<Vec<Conference>> {
        self.with_conn(|c| conferences::list(c, user_id))
    }

    pub fn update_conference(
        &self,
        user_id: &str,
        id: &str,
        patch: &ConferencePatch,
    ) -> WolfStreetResult<Conference> {
        self.with_conn(|c| conferences::update(c, user_id, id, patch))
    }

    pub fn set_conference_link(
        &self,
        user_id: &str,
        id: &str,
        calendar_event_id: &str,
        calendar_source: &str,
    ) -> WolfStreetResult<()> {
        self.with_conn(|c| conferences::set_link(c, user_id, id, calendar_event_id, calendar_source))
    }

    pub fn conference_linked_to(
        &self,
        user_id: &str,
        calendar_event_id: &str,
    ) -> WolfStreetResult<Option<Conference>> {
        self.with_conn(|c| conferences::linked_to(c, user_id, calendar_event_id))
    }

    pub fn linked_calendar_event_ids(&self, user_id: &str) -> WolfStreetResult<HashSet<String>> {
        self.with_conn(|c| conferences::linked_calendar_event_ids(c, user_id))
    }

    // CALENDAR EVENTS:

    pub fn insert_calendar_event(
        &self,
        user_id: &str,
        event: &NewCalendarEvent,
    ) -> WolfStreetResult<CalendarEvent> {
        self.with_conn(|c| calendar_events::insert(c, user_id, event, None))
    }

    pub fn get_calendar_event(&self, user_id: &str, id: &str) -> WolfStreetResult<CalendarEvent> {
        self.with_conn(|c| calendar_events::get(c, user_id, id))
    }

    /// Events starting on or after `from` (all events when `None`), ascending.
    pub fn list_calendar_events(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
    ) -> WolfStreetResult<Vec<CalendarEvent>> {
        self.with_conn(|c| calendar_events::list(c, user_id, from))
    }

    pub fn update_calendar_event(
        &self,
        user_id: &str,
        id: &str,
        patch: &CalendarEventPatch,
    ) -> WolfStreetResult<CalendarEvent> {
        self.with_conn(|c| calendar_events::update(c, user_id, id, patch))
    }

    /// Existing conference event for a title and (expanded) date range.
    pub fn find_conference_event(
        &self,
        user_id: &str,
        title: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> WolfStreetResult<Option<CalendarEvent>> {
        self.with_conn(|c| calendar_events::find_conference_event(c, user_id, title, start, end))
    }

    /// Delete an event and clear any conference link pointing at it.
    pub fn delete_calendar_event(&self, user_id: &str, id: &str) -> WolfStreetResult<()> {
        self.transaction(|tx| {
            conferences::clear_links_to(tx, user_id, id)?;
            calendar_events::delete(tx, user_id, id)
        })
    }
}
