//! Core types and workflows for Wolf Street.
//!
//! This crate is shared by the server, the Outlook provider and the CLI:
//! - `conference` / `calendar_event` / `travel` hold the domain model
//! - `store` is the SQLite-backed relational store (all queries user-scoped)
//! - `linker` keeps a conference and its calendar event consistent
//! - `import` promotes conference-like calendar events to conferences
//! - `ingest` classifies conference-from-URL parse results
//! - `ics` renders calendar invites
//! - `outlook` holds the proxy protocol and the client-side OAuth bridge
//! - `session` gates access behind the approval/admin flags

pub mod calendar_event;
pub mod conference;
pub mod config;
pub mod error;
pub mod ics;
pub mod import;
pub mod ingest;
pub mod linker;
pub mod outlook;
pub mod session;
pub mod store;
pub mod travel;

pub use calendar_event::{CalendarEvent, CalendarEventPatch, EventType, NewCalendarEvent};
pub use conference::{Conference, ConferenceDraft, ConferencePatch};
pub use error::{WolfStreetError, WolfStreetResult};
pub use session::{Profile, SessionContext};
pub use store::Store;
pub use travel::TravelDays;
