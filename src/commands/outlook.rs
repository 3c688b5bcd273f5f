//! Outlook connection and one-way sync

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use wolfstreet_core::outlook::{ConnectionState, FileTokenStore, OutlookBridge};
use wolfstreet_core::{SessionContext, WolfStreetError};

use crate::client::Client;
use crate::render::{Render, pluralize};
use crate::utils::tui;

/// Port of the registered redirect URI, http://localhost:8085/callback
pub const DEFAULT_REDIRECT_PORT: u16 = 8085;

type Session = SessionContext<Client, FileTokenStore>;

async fn start_session(client: &Client) -> Result<Session> {
    let profile = client.me().await?;
    let bridge = OutlookBridge::new(client.clone(), FileTokenStore::default_location()?)?;
    Ok(SessionContext::start(profile, bridge)?)
}

pub async fn status(client: &Client) -> Result<()> {
    let mut session = start_session(client).await?;
    println!("Signed in as {}", session.profile().display_name().bold());

    let outlook = session.outlook();
    println!("Outlook: {}", outlook.state().render());
    if let Some(tokens) = outlook.tokens() {
        if let Some(expires) = chrono::DateTime::from_timestamp_millis(tokens.expires_at) {
            println!("   Token expires {}", expires.to_rfc3339().dimmed());
        }
    }
    Ok(())
}

pub async fn connect(client: &Client, port: u16) -> Result<()> {
    let mut session = start_session(client).await?;
    let outlook = session.outlook();

    if outlook.state() == ConnectionState::Connected {
        println!("Outlook is already connected.");
        return Ok(());
    }

    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("Failed to listen for the Outlook redirect on port {port}"))?;

    let auth_url = outlook.connect().await?;
    println!("Open this URL in your browser to connect Outlook:\n");
    println!("{auth_url}\n");

    if open::that(&auth_url).is_err() {
        println!("(Could not open browser automatically, please copy the URL above)");
    }

    let params = wait_for_callback(listener).await?;
    if let Some(error) = params.get("error") {
        let detail = params.get("error_description").unwrap_or(error);
        bail!("Microsoft declined the authorization: {detail}");
    }
    let code = params
        .get("code")
        .ok_or_else(|| anyhow!("No code in Outlook redirect"))?;

    println!("Received authorization code, exchanging for tokens...");
    outlook.complete_authorization(code).await?;

    println!("{}", "Outlook connected.".green());
    Ok(())
}

pub async fn sync(client: &Client, from: Option<NaiveDate>) -> Result<()> {
    let mut session = start_session(client).await?;
    let events = client.list_calendar_events(from).await?;

    if events.is_empty() {
        println!("No calendar events to push.");
        return Ok(());
    }

    let spinner = tui::create_spinner(format!(
        "Pushing {} {} to Outlook",
        events.len(),
        pluralize("event", events.len())
    ));
    let result = session.outlook().sync_events(&events).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e @ (WolfStreetError::NotConnected | WolfStreetError::SessionExpired)) => {
            bail!("{e}. Run `wolfstreet outlook connect` first.")
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", report.render());
    Ok(())
}

pub async fn disconnect(client: &Client) -> Result<()> {
    let mut session = start_session(client).await?;
    session.outlook().disconnect()?;
    println!("Outlook disconnected.");
    Ok(())
}

/// Accept one redirect on `listener` and return its query parameters.
async fn wait_for_callback(listener: TcpListener) -> Result<HashMap<String, String>> {
    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept Outlook redirect")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read Outlook redirect")?;

    let params = callback_params(&request_line)?;

    // Headers end at the first blank line.
    let mut header = String::new();
    while reader.read_line(&mut header).await? > 2 {
        header.clear();
    }

    let body = if params.contains_key("code") {
        "<h1>Outlook connected</h1><p>You can close this window and return to the terminal.</p>"
    } else {
        "<h1>Outlook was not connected</h1><p>Return to the terminal for details.</p>"
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body>{body}</body></html>"
    );

    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    Ok(params)
}

fn callback_params(request_line: &str) -> Result<HashMap<String, String>> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{target}"))?;
    Ok(url.query_pairs().into_owned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;

    #[test]
    fn reads_query_from_request_line() {
        let params = callback_params("GET /callback?code=M.C5&session_state=abc%20d HTTP/1.1\r\n").unwrap();
        assert_eq!(params["code"], "M.C5");
        assert_eq!(params["session_state"], "abc d");
    }

    #[test]
    fn rejects_garbage() {
        assert!(callback_params("\r\n").is_err());
    }

    #[tokio::test]
    async fn callback_answers_the_browser() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let browser = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /callback?error=access_denied HTTP/1.1\r\nHost: localhost\r\n\r\n")
                .await
                .unwrap();
            let mut page = String::new();
            stream.read_to_string(&mut page).await.unwrap();
            page
        });

        let params = wait_for_callback(listener).await.unwrap();
        assert_eq!(params["error"], "access_denied");

        let page = browser.await.unwrap();
        assert!(page.starts_with("HTTP/1.1 200 OK"));
        assert!(page.contains("Outlook was not connected"));
    }
}
