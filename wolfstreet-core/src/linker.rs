//! Keeps a conference and its calendar event consistent.
//!
//! A conference links to at most one calendar event through its
//! `calendar_event_id`. Every check/dedup/create/link sequence runs inside one
//! store transaction, and conference events carry a deterministic dedup key,
//! so repeated or racing calls converge on the same event.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::calendar_event::{CalendarEvent, CalendarEventPatch, EventType, NewCalendarEvent};
use crate::conference::{CALENDAR_SOURCE_INTERNAL, Conference, ConferenceDraft, ConferencePatch};
use crate::error::WolfStreetResult;
use crate::store::{Store, calendar_events, conferences};
use crate::travel::TravelDays;

/// Views that must be refreshed after a mutation.
pub const VIEW_CONFERENCES: &str = "conferences";
pub const VIEW_CALENDAR_EVENTS: &str = "calendar-events";

/// Result of ensuring a conference has a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub calendar_event_id: String,
    /// False when an existing link or a matching event was reused
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOutcome {
    pub conference: Conference,
    pub link: Option<LinkOutcome>,
    /// Set when the conference was saved but its calendar step failed
    pub calendar_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOutcome {
    pub conference: Conference,
    pub calendar_warning: Option<String>,
}

pub struct Linker<'a> {
    store: &'a Store,
    user_id: &'a str,
}

impl<'a> Linker<'a> {
    pub fn new(store: &'a Store, user_id: &'a str) -> Self {
        Linker { store, user_id }
    }

    /// Save a new conference, then give it a calendar event.
    ///
    /// The conference insert is not undone if the calendar step fails; the
    /// failure comes back as `calendar_warning`.
    #[instrument(skip(self, draft), fields(user_id = %self.user_id, name = %draft.name))]
    pub fn create_conference(
        &self,
        draft: &ConferenceDraft,
        travel: Option<TravelDays>,
    ) -> WolfStreetResult<CreateOutcome> {
        if let Some(travel) = travel {
            travel.validate()?;
        }
        let conference = self.store.insert_conference(self.user_id, draft)?;
        info!(conference_id = %conference.id, views = VIEW_CONFERENCES, "conference created");

        match self.create_calendar_event_for_conference(&conference.id, travel) {
            Ok(link) => {
                let conference = self.store.get_conference(self.user_id, &conference.id)?;
                Ok(CreateOutcome {
                    conference,
                    link: Some(link),
                    calendar_warning: None,
                })
            }
            Err(e) => {
                warn!(conference_id = %conference.id, error = %e, "calendar event creation failed");
                Ok(CreateOutcome {
                    conference,
                    link: None,
                    calendar_warning: Some(format!("Conference saved, but calendar sync failed: {e}")),
                })
            }
        }
    }

    /// Apply an edit to a conference and carry it over to the calendar.
    ///
    /// Linked conferences are re-expanded when `travel` is given and updated
    /// field for field otherwise. An unlinked conference gets a calendar event
    /// only when travel days are chosen.
    #[instrument(skip(self, patch), fields(user_id = %self.user_id))]
    pub fn edit_conference(
        &self,
        conference_id: &str,
        patch: &ConferencePatch,
        travel: Option<TravelDays>,
    ) -> WolfStreetResult<EditOutcome> {
        if let Some(travel) = travel {
            travel.validate()?;
        }
        let conference = self
            .store
            .update_conference(self.user_id, conference_id, patch)?;
        info!(conference_id, views = VIEW_CONFERENCES, "conference updated");

        let propagated = match (conference.calendar_event_id.as_deref(), travel) {
            (Some(event_id), Some(_)) => self
                .update_calendar_event_with_travel_days(event_id, &conference, travel)
                .map(|_| ()),
            (Some(event_id), None) if patch.touches_calendar() => self
                .update_calendar_event_from_conference(event_id, patch)
                .map(|_| ()),
            (None, Some(_)) => self
                .create_calendar_event_for_conference(conference_id, travel)
                .map(|_| ()),
            _ => Ok(()),
        };

        let calendar_warning = match propagated {
            Ok(()) => None,
            Err(e) => {
                warn!(conference_id, error = %e, "calendar propagation failed");
                Some(format!("Conference saved, but calendar sync failed: {e}"))
            }
        };

        Ok(EditOutcome {
            conference: self.store.get_conference(self.user_id, conference_id)?,
            calendar_warning,
        })
    }

    /// Ensure the conference is represented by exactly one calendar event.
    ///
    /// Returns the existing link unchanged if there is one. Otherwise reuses a
    /// conference event with the same title and expanded range, or creates
    /// one, and links it back.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub fn create_calendar_event_for_conference(
        &self,
        conference_id: &str,
        travel: Option<TravelDays>,
    ) -> WolfStreetResult<LinkOutcome> {
        let user_id = self.user_id;
        let travel = travel.unwrap_or_default();

        let outcome = self.store.transaction(|tx| {
            let conference = conferences::get(tx, user_id, conference_id)?;
            if let Some(existing) = &conference.calendar_event_id {
                return Ok(LinkOutcome {
                    calendar_event_id: existing.clone(),
                    created: false,
                });
            }

            let (start, end) = travel.expand(conference.start_date, conference.end_date)?;

            let outcome =
                match calendar_events::find_conference_event(tx, user_id, &conference.name, start, end)? {
                    Some(found) => LinkOutcome {
                        calendar_event_id: found.id,
                        created: false,
                    },
                    None => {
                        let key = calendar_events::dedup_key(user_id, &conference.name, start, end);
                        let new = conference_event(&conference, start, end, travel);
                        LinkOutcome {
                            calendar_event_id: calendar_events::insert(tx, user_id, &new, Some(key.as_str()))?.id,
                            created: true,
                        }
                    }
                };

            conferences::set_link(
                tx,
                user_id,
                conference_id,
                &outcome.calendar_event_id,
                CALENDAR_SOURCE_INTERNAL,
            )?;
            Ok(outcome)
        })?;

        info!(
            conference_id,
            calendar_event_id = %outcome.calendar_event_id,
            created = outcome.created,
            views = ?[VIEW_CONFERENCES, VIEW_CALENDAR_EVENTS],
            "conference linked"
        );
        Ok(outcome)
    }

    /// Overwrite a calendar event with the conference's fields and a freshly
    /// expanded range. No travel collapses the range back to the conference.
    #[instrument(skip(self, conference), fields(user_id = %self.user_id, conference_id = %conference.id))]
    pub fn update_calendar_event_with_travel_days(
        &self,
        calendar_event_id: &str,
        conference: &Conference,
        travel: Option<TravelDays>,
    ) -> WolfStreetResult<CalendarEvent> {
        let travel = travel.unwrap_or_default();
        let (start, end) = travel.expand(conference.start_date, conference.end_date)?;

        let patch = CalendarEventPatch {
            title: Some(conference.name.clone()),
            description: Some(conference.description.clone().unwrap_or_default()),
            start_date: Some(start),
            end_date: Some(end),
            location: Some(conference.location.clone()),
            travel: Some(travel),
            ..Default::default()
        };

        let event = self
            .store
            .update_calendar_event(self.user_id, calendar_event_id, &patch)?;
        info!(calendar_event_id, views = VIEW_CALENDAR_EVENTS, "calendar event re-expanded");
        Ok(event)
    }

    /// Field-for-field propagation of a conference edit. The event keeps its
    /// stored travel padding around the new dates.
    #[instrument(skip(self, patch), fields(user_id = %self.user_id))]
    pub fn update_calendar_event_from_conference(
        &self,
        calendar_event_id: &str,
        patch: &ConferencePatch,
    ) -> WolfStreetResult<CalendarEvent> {
        let user_id = self.user_id;

        let event = self.store.transaction(|tx| {
            let travel = calendar_events::get(tx, user_id, calendar_event_id)?.travel;
            let (start, end) = match (patch.start_date, patch.end_date) {
                (Some(s), Some(e)) => {
                    let (s, e) = travel.expand(s, e)?;
                    (Some(s), Some(e))
                }
                (s, e) => (
                    s.map(|s| travel.expand(s, s).map(|r| r.0)).transpose()?,
                    e.map(|e| travel.expand(e, e).map(|r| r.1)).transpose()?,
                ),
            };

            let event_patch = CalendarEventPatch {
                title: patch.name.clone(),
                description: patch.description.clone(),
                start_date: start,
                end_date: end,
                location: patch.location.clone(),
                ..Default::default()
            };
            calendar_events::update(tx, user_id, calendar_event_id, &event_patch)
        })?;

        info!(calendar_event_id, views = VIEW_CALENDAR_EVENTS, "calendar event updated from conference");
        Ok(event)
    }

    /// Reverse propagation: carry a calendar event edit onto the conference.
    /// Dates are contracted by the travel padding of the linked event.
    #[instrument(skip(self, patch), fields(user_id = %self.user_id))]
    pub fn update_conference_from_calendar_event(
        &self,
        conference_id: &str,
        patch: &CalendarEventPatch,
    ) -> WolfStreetResult<Conference> {
        let user_id = self.user_id;

        let conference = self.store.transaction(|tx| {
            let conference = conferences::get(tx, user_id, conference_id)?;
            let travel = match (patch.travel, conference.calendar_event_id.as_deref()) {
                (Some(travel), _) => travel,
                (None, Some(event_id)) => calendar_events::get(tx, user_id, event_id)?.travel,
                (None, None) => TravelDays::default(),
            };

            let conference_patch = ConferencePatch {
                name: patch.title.clone(),
                start_date: patch
                    .start_date
                    .map(|s| travel.contract(s, s).map(|r| r.0))
                    .transpose()?,
                end_date: patch
                    .end_date
                    .map(|e| travel.contract(e, e).map(|r| r.1))
                    .transpose()?,
                location: patch.location.clone(),
                description: patch.description.clone(),
                ..Default::default()
            };
            conferences::update(tx, user_id, conference_id, &conference_patch)
        })?;

        info!(conference_id, views = VIEW_CONFERENCES, "conference updated from calendar event");
        Ok(conference)
    }

    /// Link-only write used when the calendar event already exists.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub fn link_existing_calendar_event(
        &self,
        conference_id: &str,
        calendar_event_id: &str,
    ) -> WolfStreetResult<()> {
        let user_id = self.user_id;

        self.store.transaction(|tx| {
            calendar_events::get(tx, user_id, calendar_event_id)?;
            conferences::set_link(tx, user_id, conference_id, calendar_event_id, CALENDAR_SOURCE_INTERNAL)
        })?;

        info!(conference_id, calendar_event_id, views = VIEW_CONFERENCES, "calendar event linked");
        Ok(())
    }
}

fn conference_event(
    conference: &Conference,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    travel: TravelDays,
) -> NewCalendarEvent {
    let mut new = NewCalendarEvent::all_day(conference.name.clone(), start, end);
    new.description = conference.description.clone();
    new.location = Some(conference.location.clone());
    new.event_type = EventType::Conference;
    new.travel = travel;
    new
}
