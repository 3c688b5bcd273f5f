//! ICS invite generation (RFC 5545).

mod invite;

pub use invite::{INVITE_FILENAME, generate_invite};
