pub mod account;
pub mod admin;
pub mod conferences;
pub mod events;
pub mod import;
pub mod ingest;
pub mod invite;
pub mod outlook;

use clap::Args;
use wolfstreet_core::TravelDays;

/// Travel padding flags shared by every command that can touch a
/// conference's calendar event.
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct TravelArgs {
    /// Days of travel before the conference starts
    #[arg(long, value_name = "DAYS")]
    pub travel_before: Option<u32>,

    /// Days of travel after the conference ends
    #[arg(long, value_name = "DAYS")]
    pub travel_after: Option<u32>,
}

impl TravelArgs {
    /// `None` unless at least one flag was given.
    pub fn travel(&self) -> Option<TravelDays> {
        if self.travel_before.is_none() && self.travel_after.is_none() {
            return None;
        }
        Some(TravelDays::new(
            self.travel_before.unwrap_or(0),
            self.travel_after.unwrap_or(0),
        ))
    }
}
