//! Calendar event list, create and delete

use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use wolfstreet_core::NewCalendarEvent;

use crate::client::Client;
use crate::render::{Render, pluralize};

pub async fn list(client: &Client, from: Option<NaiveDate>) -> Result<()> {
    let events = client.list_calendar_events(from).await?;

    if events.is_empty() {
        println!("No calendar events.");
        return Ok(());
    }

    for event in &events {
        println!("{}", event.render());
    }
    println!("\n{} {}", events.len(), pluralize("event", events.len()));
    Ok(())
}

pub async fn create(client: &Client, event: &NewCalendarEvent) -> Result<()> {
    let created = client.create_calendar_event(event).await?;
    println!("{} {}", "Created".green(), created.render());
    Ok(())
}

pub async fn delete(client: &Client, id: &str) -> Result<()> {
    client.delete_calendar_event(id).await?;
    println!("{} {}", "Deleted".red(), id);
    Ok(())
}
