//! Add a conference from a web page

use anyhow::{Result, bail};
use chrono::NaiveDate;
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;
use wolfstreet_core::TravelDays;
use wolfstreet_core::ingest::{ConferenceFields, ParseResult};

use crate::client::Client;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(
    client: &Client,
    url: &str,
    conference_id: Option<&str>,
    travel: Option<TravelDays>,
    yes: bool,
) -> Result<()> {
    let spinner = tui::create_spinner(format!("Reading {url}"));
    let result = client.ingest(url).await;
    spinner.finish_and_clear();

    let result = result?;
    println!("{}\n", result.render());

    let mut fields = match result {
        ParseResult::Parsed(fields) | ParseResult::FallbackStub(fields) => fields,
        ParseResult::Failed(reason) => bail!("Could not read a conference from {url}: {reason}"),
    };

    if !fields.missing().is_empty() {
        if yes {
            bail!("Missing required fields: {}", fields.missing().join(", "));
        }
        fill_missing(&mut fields)?;
        println!("\n{}", fields.render());
    }

    if !yes
        && !Confirm::new()
            .with_prompt("Save this conference?")
            .default(true)
            .interact()?
    {
        println!("Discarded.");
        return Ok(());
    }

    let outcome = client
        .save_ingested(conference_id, &fields, url, travel)
        .await?;

    let verb = if conference_id.is_some() { "Updated" } else { "Saved" };
    println!("{} {}", verb.green(), outcome.conference.render());
    if let Some(warning) = outcome.calendar_warning {
        println!("{} {}", "Calendar not updated:".yellow(), warning);
    }
    Ok(())
}

/// Prompt for every required field the page did not yield.
fn fill_missing(fields: &mut ConferenceFields) -> Result<()> {
    if fields.name.is_none() {
        fields.name = Some(Input::<String>::new().with_prompt("Conference name").interact_text()?);
    }
    if fields.start_date.is_none() {
        fields.start_date = Some(prompt_date("Start date (YYYY-MM-DD)")?);
    }
    if fields.end_date.is_none() {
        let start = fields.start_date;
        let mut input = Input::<NaiveDate>::new().with_prompt("End date (YYYY-MM-DD)");
        if let Some(start) = start {
            input = input.default(start);
        }
        fields.end_date = Some(input.interact_text()?);
    }
    if fields.location.is_none() && fields.venue.is_none() {
        fields.location = Some(Input::<String>::new().with_prompt("Location").interact_text()?);
    }
    Ok(())
}

fn prompt_date(prompt: &str) -> Result<NaiveDate> {
    Ok(Input::<NaiveDate>::new().with_prompt(prompt).interact_text()?)
}
