//! Outlook calendar integration, client side.
//!
//! The OAuth client secret lives with the server-side proxy; this side only
//! holds tokens and drives the connection state machine.

mod bridge;
pub mod protocol;
mod tokens;

pub use bridge::{ConnectionState, OutlookBridge, OutlookProxy};
pub use tokens::{FileTokenStore, OUTLOOK_TOKENS_KEY, OutlookTokens, TokenStore};
