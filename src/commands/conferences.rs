//! Conference list, create, edit and calendar linking

use anyhow::Result;
use owo_colors::OwoColorize;
use wolfstreet_core::{ConferenceDraft, ConferencePatch, TravelDays};

use crate::client::Client;
use crate::render::{Render, pluralize};

pub async fn list(client: &Client) -> Result<()> {
    let conferences = client.list_conferences().await?;

    if conferences.is_empty() {
        println!("No conferences yet. Add one with `wolfstreet conferences new`.");
        return Ok(());
    }

    for conference in &conferences {
        println!("{}", conference.render());
    }
    println!(
        "\n{} {}",
        conferences.len(),
        pluralize("conference", conferences.len())
    );
    Ok(())
}

pub async fn create(
    client: &Client,
    draft: &ConferenceDraft,
    travel: Option<TravelDays>,
) -> Result<()> {
    let outcome = client.create_conference(draft, travel).await?;

    println!("{} {}", "Created".green(), outcome.conference.render());
    if let Some(link) = outcome.link {
        let how = if link.created { "created" } else { "reused" };
        println!("   Calendar event {} ({how})", link.calendar_event_id.dimmed());
    }
    warn_calendar(outcome.calendar_warning.as_deref());
    Ok(())
}

pub async fn edit(
    client: &Client,
    id: &str,
    patch: &ConferencePatch,
    travel: Option<TravelDays>,
) -> Result<()> {
    let outcome = client.edit_conference(id, patch, travel).await?;

    println!("{} {}", "Updated".green(), outcome.conference.render());
    warn_calendar(outcome.calendar_warning.as_deref());
    Ok(())
}

/// Link a conference to an existing event, or give it a calendar event of
/// its own when no event id is passed.
pub async fn link(
    client: &Client,
    id: &str,
    event_id: Option<&str>,
    travel: Option<TravelDays>,
) -> Result<()> {
    match event_id {
        Some(event_id) => {
            let conference = client.link_calendar_event(id, event_id).await?;
            println!("{} {}", "Linked".green(), conference.render());
        }
        None => {
            let link = client.create_calendar_event_for_conference(id, travel).await?;
            if link.created {
                println!("{} calendar event {}", "Created".green(), link.calendar_event_id);
            } else {
                println!("Already on the calendar as {}", link.calendar_event_id);
            }
        }
    }
    Ok(())
}

fn warn_calendar(warning: Option<&str>) {
    if let Some(warning) = warning {
        println!("{} {}", "Calendar not updated:".yellow(), warning);
    }
}
