//! Profile administration

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::render::{Render, pluralize};

pub async fn list(client: &Client) -> Result<()> {
    let profiles = client.list_profiles().await?;
    let pending = profiles.iter().filter(|p| !p.is_approved).count();

    for profile in &profiles {
        println!("{}", profile.render());
    }
    println!(
        "\n{} {}, {} pending approval",
        profiles.len(),
        pluralize("profile", profiles.len()),
        pending
    );
    Ok(())
}

pub async fn set_approval(client: &Client, user_id: &str, approved: bool) -> Result<()> {
    let profile = client.set_approval(user_id, approved).await?;
    let verb = if approved { "Approved" } else { "Revoked" };
    println!("{} {}", verb.green(), profile.render());
    Ok(())
}

pub async fn set_admin(client: &Client, user_id: &str, admin: bool) -> Result<()> {
    let profile = client.set_admin(user_id, admin).await?;
    let verb = if admin { "Promoted" } else { "Demoted" };
    println!("{} {}", verb.green(), profile.render());
    Ok(())
}
