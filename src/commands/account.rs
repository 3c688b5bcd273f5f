//! Sign-up, whoami and sign-out

use anyhow::Result;
use owo_colors::OwoColorize;
use wolfstreet_core::SessionContext;
use wolfstreet_core::outlook::{FileTokenStore, OutlookBridge};

use crate::client::Client;
use crate::render::Render;

pub async fn signup(client: &Client, email: &str, name: Option<&str>) -> Result<()> {
    let profile = client.register(email, name).await?;
    println!("{}", profile.render());

    if profile.is_approved {
        println!("\nYour account is approved.");
    } else {
        println!(
            "\n{}",
            "Your account is awaiting approval. An admin will review it shortly.".yellow()
        );
    }
    Ok(())
}

pub async fn whoami(client: &Client) -> Result<()> {
    let profile = client.me().await?;
    println!("{}", profile.render());
    Ok(())
}

pub async fn sign_out(client: &Client) -> Result<()> {
    let profile = client.me().await?;
    let bridge = OutlookBridge::new(client.clone(), FileTokenStore::default_location()?)?;
    let session = SessionContext::start(profile, bridge)?;

    let profile = session.sign_out()?;
    println!("Signed out {}. Outlook tokens removed.", profile.display_name().bold());
    Ok(())
}
