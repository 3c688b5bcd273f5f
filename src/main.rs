mod client;
mod commands;
mod render;
mod utils;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wolfstreet_core::config::AppConfig;
use wolfstreet_core::{ConferenceDraft, ConferencePatch, EventType, NewCalendarEvent, TravelDays};

use crate::client::Client;
use crate::commands::TravelArgs;

#[derive(Parser)]
#[command(name = "wolfstreet")]
#[command(about = "Track conferences, keep them on your calendar and push them to Outlook")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request an account. New accounts wait for admin approval
    Signup {
        #[arg(long)]
        email: String,

        /// Full name shown to admins
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the configured profile
    Whoami,
    /// Sign out and forget the Outlook connection
    SignOut,
    /// Manage conferences
    #[command(subcommand)]
    Conferences(ConferenceCommands),
    /// Manage calendar events
    #[command(subcommand)]
    Events(EventCommands),
    /// Turn conference-like calendar events into conferences
    Import {
        /// Import every candidate without prompting
        #[arg(long)]
        all: bool,
    },
    /// Read a conference from a web page and save it
    Ingest {
        url: String,

        /// Update this conference instead of creating one
        #[arg(long)]
        conference: Option<String>,

        #[command(flatten)]
        travel: TravelArgs,

        /// Save without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Email a calendar invite for an event
    Invite {
        event_id: String,

        /// Send to this address instead of the usual recipient
        #[arg(long)]
        test_email: Option<String>,
    },
    /// Outlook calendar connection and sync
    #[command(subcommand)]
    Outlook(OutlookCommands),
    /// Profile approval (admins only)
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Subcommand)]
enum ConferenceCommands {
    /// List your conferences
    List,
    /// Create a conference and put it on the calendar
    New {
        name: String,

        #[arg(short, long)]
        start: NaiveDate,

        #[arg(short, long)]
        end: NaiveDate,

        #[arg(short, long)]
        location: String,

        #[arg(long)]
        description: Option<String>,

        /// Repeat for several tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        url: Option<String>,

        #[command(flatten)]
        travel: TravelArgs,
    },
    /// Edit a conference. Calendar changes follow along
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        start: Option<NaiveDate>,

        #[arg(short, long)]
        end: Option<NaiveDate>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Replaces all tags. Repeat for several
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,

        #[command(flatten)]
        travel: TravelArgs,
    },
    /// Link a conference to a calendar event, creating one if needed
    Link {
        id: String,

        /// Existing calendar event to link
        #[arg(long)]
        event: Option<String>,

        #[command(flatten)]
        travel: TravelArgs,
    },
}

#[derive(Subcommand)]
enum EventCommands {
    /// List calendar events
    List {
        /// Only events starting on or after this date
        #[arg(long)]
        from: Option<NaiveDate>,
    },
    /// Create a calendar event
    New {
        title: String,

        #[arg(short, long)]
        start: NaiveDate,

        /// Last day, for multi-day events
        #[arg(short, long)]
        end: Option<NaiveDate>,

        /// Start time (HH:MM). Makes the event timed
        #[arg(long, value_parser = parse_time)]
        at: Option<NaiveTime>,

        /// End time (HH:MM)
        #[arg(long, value_parser = parse_time, requires = "at")]
        until: Option<NaiveTime>,

        #[arg(short, long)]
        location: Option<String>,

        /// meeting, deadline, conference, travel, reminder, webinar or a custom label
        #[arg(short = 't', long = "type")]
        event_type: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Default recipient for invites
        #[arg(long)]
        invite_email: Option<String>,

        #[command(flatten)]
        travel: TravelArgs,
    },
    /// Delete a calendar event
    Delete { id: String },
}

#[derive(Subcommand)]
enum OutlookCommands {
    /// Show the Outlook connection state
    Status,
    /// Connect your Outlook calendar
    Connect {
        /// Local port of the OAuth redirect
        #[arg(long, default_value_t = commands::outlook::DEFAULT_REDIRECT_PORT)]
        port: u16,
    },
    /// Push calendar events to Outlook
    Sync {
        #[arg(long)]
        from: Option<NaiveDate>,
    },
    /// Forget the Outlook tokens
    Disconnect,
}

#[derive(Subcommand)]
enum AdminCommands {
    /// List every profile
    Profiles,
    /// Approve a profile
    Approve { user_id: String },
    /// Revoke a profile's approval
    Revoke { user_id: String },
    /// Grant admin rights
    Promote { user_id: String },
    /// Remove admin rights
    Demote { user_id: String },
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("expected HH:MM, got '{s}'"))
}

fn new_event(
    title: String,
    start: NaiveDate,
    end: Option<NaiveDate>,
    at: Option<NaiveTime>,
    until: Option<NaiveTime>,
    event_type: Option<&str>,
    travel: TravelDays,
) -> NewCalendarEvent {
    let mut event = NewCalendarEvent::all_day(title, start, end.unwrap_or(start));
    event.end_date = end;
    event.start_time = at;
    event.end_time = until;
    event.all_day = at.is_none();
    event.travel = travel;

    if let Some(label) = event_type {
        event.event_type = EventType::parse(label);
        if event.event_type == EventType::Custom {
            event.type_custom = Some(label.trim().to_string());
        }
    }
    event
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let config = AppConfig::load()?;
    let client = Client::from_config(&config)?;

    match cli.command {
        Commands::Signup { email, name } => {
            commands::account::signup(&client, &email, name.as_deref()).await
        }
        Commands::Whoami => commands::account::whoami(&client).await,
        Commands::SignOut => commands::account::sign_out(&client).await,

        Commands::Conferences(cmd) => match cmd {
            ConferenceCommands::List => commands::conferences::list(&client).await,
            ConferenceCommands::New {
                name,
                start,
                end,
                location,
                description,
                tags,
                url,
                travel,
            } => {
                let draft = ConferenceDraft {
                    name,
                    start_date: start,
                    end_date: end,
                    location,
                    description,
                    tags,
                    source_url: url,
                };
                commands::conferences::create(&client, &draft, travel.travel()).await
            }
            ConferenceCommands::Edit {
                id,
                name,
                start,
                end,
                location,
                description,
                tags,
                travel,
            } => {
                let patch = ConferencePatch {
                    name,
                    start_date: start,
                    end_date: end,
                    location,
                    description,
                    tags,
                    source_url: None,
                };
                commands::conferences::edit(&client, &id, &patch, travel.travel()).await
            }
            ConferenceCommands::Link { id, event, travel } => {
                commands::conferences::link(&client, &id, event.as_deref(), travel.travel()).await
            }
        },

        Commands::Events(cmd) => match cmd {
            EventCommands::List { from } => commands::events::list(&client, from).await,
            EventCommands::New {
                title,
                start,
                end,
                at,
                until,
                location,
                event_type,
                description,
                invite_email,
                travel,
            } => {
                let mut event = new_event(
                    title,
                    start,
                    end,
                    at,
                    until,
                    event_type.as_deref(),
                    travel.travel().unwrap_or_default(),
                );
                event.location = location;
                event.description = description;
                event.invite_email = invite_email;
                commands::events::create(&client, &event).await
            }
            EventCommands::Delete { id } => commands::events::delete(&client, &id).await,
        },

        Commands::Import { all } => commands::import::run(&client, all).await,
        Commands::Ingest {
            url,
            conference,
            travel,
            yes,
        } => {
            commands::ingest::run(&client, &url, conference.as_deref(), travel.travel(), yes).await
        }
        Commands::Invite {
            event_id,
            test_email,
        } => commands::invite::run(&client, &event_id, test_email.as_deref()).await,

        Commands::Outlook(cmd) => match cmd {
            OutlookCommands::Status => commands::outlook::status(&client).await,
            OutlookCommands::Connect { port } => commands::outlook::connect(&client, port).await,
            OutlookCommands::Sync { from } => commands::outlook::sync(&client, from).await,
            OutlookCommands::Disconnect => commands::outlook::disconnect(&client).await,
        },

        Commands::Admin(cmd) => match cmd {
            AdminCommands::Profiles => commands::admin::list(&client).await,
            AdminCommands::Approve { user_id } => {
                commands::admin::set_approval(&client, &user_id, true).await
            }
            AdminCommands::Revoke { user_id } => {
                commands::admin::set_approval(&client, &user_id, false).await
            }
            AdminCommands::Promote { user_id } => {
                commands::admin::set_admin(&client, &user_id, true).await
            }
            AdminCommands::Demote { user_id } => {
                commands::admin::set_admin(&client, &user_id, false).await
            }
        },
    }
}
