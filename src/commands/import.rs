//! Promote conference-like calendar events to conferences

use anyhow::Result;
use dialoguer::MultiSelect;
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::render::{Render, pluralize};

pub async fn run(client: &Client, all: bool) -> Result<()> {
    let candidates = client.import_candidates().await?;

    if candidates.is_empty() {
        println!("No conference-like calendar events to import.");
        return Ok(());
    }

    let event_ids: Vec<String> = if all {
        candidates.iter().map(|e| e.id.clone()).collect()
    } else {
        let items: Vec<String> = candidates.iter().map(|e| e.render()).collect();
        let defaults = vec![true; items.len()];

        let selections = MultiSelect::new()
            .with_prompt("Select events to import (space to toggle, enter to confirm)")
            .items(&items)
            .defaults(&defaults)
            .interact()?;

        selections
            .into_iter()
            .map(|i| candidates[i].id.clone())
            .collect()
    };

    if event_ids.is_empty() {
        println!("Nothing selected.");
        return Ok(());
    }

    let imported = client.import(&event_ids).await?;
    println!(
        "{} {} {}",
        "Imported".green(),
        imported.len(),
        pluralize("conference", imported.len())
    );
    for conference in &imported {
        println!("  {}", conference.render());
    }
    Ok(())
}
