use anyhow::Result;
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::utils::tui;

pub async fn run(client: &Client, event_id: &str, test_email: Option<&str>) -> Result<()> {
    let spinner = tui::create_spinner("Sending calendar invite".to_string());
    let result = client.send_invite(event_id, test_email).await;
    spinner.finish_and_clear();

    let sent = result?;
    println!("{} {}", "Invite sent to".green(), sent.sent_to.bold());
    Ok(())
}
