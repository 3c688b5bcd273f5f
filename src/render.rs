//! TUI rendering traits for Wolf Street types.
//!
//! Extension traits that add colored terminal rendering to wolfstreet-core
//! types using owo_colors.

use owo_colors::OwoColorize;
use wolfstreet_core::ingest::{ConferenceFields, ParseResult};
use wolfstreet_core::outlook::ConnectionState;
use wolfstreet_core::outlook::protocol::SyncReport;
use wolfstreet_core::{CalendarEvent, Conference, Profile};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

fn render_range(start: chrono::NaiveDate, end: chrono::NaiveDate) -> String {
    if start == end {
        start.format("%b %-d, %Y").to_string()
    } else {
        format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
    }
}

impl Render for Conference {
    fn render(&self) -> String {
        let link = if self.is_linked() {
            "📅".to_string()
        } else {
            " ".to_string()
        };

        format!(
            "{} {} {} {} {}",
            link,
            self.name.bold(),
            render_range(self.start_date, self.end_date).dimmed(),
            self.location.cyan(),
            self.id.dimmed()
        )
    }
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let when = match (self.all_day, self.start_time) {
            (false, Some(time)) => format!(
                "{} {}",
                self.start_date.format("%b %-d, %Y"),
                time.format("%H:%M")
            ),
            _ => render_range(self.start_date, self.last_day()),
        };

        let mut line = format!(
            "{} {} {}",
            format!("[{}]", self.type_label()).magenta(),
            self.title.bold(),
            when.dimmed()
        );

        if !self.travel.is_empty() {
            line.push_str(&format!(
                " {}",
                format!("✈️ +{}/+{}", self.travel.before, self.travel.after).yellow()
            ));
        }

        line.push_str(&format!(" {}", self.id.dimmed()));
        line
    }
}

impl Render for Profile {
    fn render(&self) -> String {
        let status = if self.is_approved {
            "approved".green().to_string()
        } else {
            "pending".yellow().to_string()
        };
        let admin = if self.is_admin {
            format!(" {}", "admin".magenta())
        } else {
            String::new()
        };

        format!(
            "{} <{}> {}{} {}",
            self.display_name().bold(),
            self.email,
            status,
            admin,
            self.user_id.dimmed()
        )
    }
}

impl Render for ConnectionState {
    fn render(&self) -> String {
        match self {
            ConnectionState::Connected => self.as_str().green().to_string(),
            ConnectionState::AuthorizationPending => self.as_str().yellow().to_string(),
            ConnectionState::Disconnected => self.as_str().dimmed().to_string(),
        }
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} synced, {} failed",
            self.synced.green(),
            if self.failed > 0 {
                self.failed.red().to_string()
            } else {
                self.failed.to_string()
            }
        )];

        for failure in &self.errors {
            lines.push(format!("   {} {} {}", "✗".red(), failure.event_id, failure.error.dimmed()));
        }

        lines.join("\n")
    }
}

impl Render for ConferenceFields {
    fn render(&self) -> String {
        let missing = "(missing)".red().to_string();
        let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| missing.clone());

        let mut lines = vec![
            format!("   Name:     {}", self.name.clone().unwrap_or_else(|| missing.clone())),
            format!("   Start:    {}", date(self.start_date)),
            format!("   End:      {}", date(self.end_date)),
            format!(
                "   Location: {}",
                self.location
                    .clone()
                    .or_else(|| self.venue.clone())
                    .unwrap_or_else(|| missing.clone())
            ),
        ];
        if !self.tags.is_empty() {
            lines.push(format!("   Tags:     {}", self.tags.join(", ").dimmed()));
        }
        if let Some(ref description) = self.description {
            lines.push(format!("   {}", description.dimmed()));
        }

        lines.join("\n")
    }
}

impl Render for ParseResult {
    fn render(&self) -> String {
        match self {
            ParseResult::Parsed(fields) => format!("{}\n{}", "Parsed conference page".green(), fields.render()),
            ParseResult::FallbackStub(fields) => format!(
                "{}\n{}",
                "Could not fetch the page, only a stub was extracted".yellow(),
                fields.render()
            ),
            ParseResult::Failed(reason) => format!("{} {}", "Parsing failed:".red(), reason),
        }
    }
}

/// Pluralize a word based on count
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
