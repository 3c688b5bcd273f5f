//! Server-side Outlook proxy for Wolf Street.
//!
//! Holds the OAuth client credentials, builds the Microsoft authorization
//! URL, exchanges authorization codes for tokens and pushes calendar events
//! to Microsoft Graph one at a time.

pub mod app_config;
mod graph;
mod oauth;
mod service;
mod to_outlook;

pub use app_config::OutlookAppConfig;
pub use graph::GRAPH_API_BASE;
pub use oauth::{LOGIN_BASE, SCOPES};
pub use service::{OutlookReply, OutlookService};
pub use to_outlook::{OutlookEvent, ToOutlook};
