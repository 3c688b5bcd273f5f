//! Travel-day padding around a conference.
//!
//! Padding is stored as two structured columns on the calendar event. The
//! human-readable travel summary is derived from them on demand and never
//! written into the description.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{WolfStreetError, WolfStreetResult};

/// Upper bound for either side of the padding.
pub const MAX_TRAVEL_DAYS: u32 = 365;

/// Format used for dates inside the travel summary, e.g. "Jun 9, 2025".
const SUMMARY_DATE_FORMAT: &str = "%b %-d, %Y";

/// Days of travel before and after a conference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelDays {
    #[serde(default)]
    pub before: u32,
    #[serde(default)]
    pub after: u32,
}

impl TravelDays {
    pub fn new(before: u32, after: u32) -> Self {
        TravelDays { before, after }
    }

    pub fn is_empty(&self) -> bool {
        self.before == 0 && self.after == 0
    }

    pub fn validate(&self) -> WolfStreetResult<()> {
        if self.before > MAX_TRAVEL_DAYS || self.after > MAX_TRAVEL_DAYS {
            return Err(WolfStreetError::Validation(format!(
                "Travel days must be between 0 and {MAX_TRAVEL_DAYS}"
            )));
        }
        Ok(())
    }

    /// Widen a conference date range by the travel days.
    pub fn expand(&self, start: NaiveDate, end: NaiveDate) -> WolfStreetResult<(NaiveDate, NaiveDate)> {
        self.validate()?;
        Ok((
            shift(start.checked_sub_days(Days::new(u64::from(self.before))))?,
            shift(end.checked_add_days(Days::new(u64::from(self.after))))?,
        ))
    }

    /// Inverse of [`TravelDays::expand`]: recover the conference range from
    /// a padded calendar range.
    pub fn contract(&self, start: NaiveDate, end: NaiveDate) -> WolfStreetResult<(NaiveDate, NaiveDate)> {
        self.validate()?;
        Ok((
            shift(start.checked_add_days(Days::new(u64::from(self.before))))?,
            shift(end.checked_sub_days(Days::new(u64::from(self.after))))?,
        ))
    }

    /// Travel summary for a conference running from `start` to `end`
    /// (unpadded). `None` when there is no travel.
    pub fn summary(&self, start: NaiveDate, end: NaiveDate) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let (depart, ret) = self.expand(start, end).ok()?;
        let mut lines = Vec::with_capacity(3);

        if self.before > 0 {
            lines.push(format!("✈️ Travel: {}", fmt_date(depart)));
        }

        if start == end {
            lines.push(format!("📍 Conference: {}", fmt_date(start)));
        } else {
            lines.push(format!(
                "📍 Conference: {} - {}",
                fmt_date(start),
                fmt_date(end)
            ));
        }

        if self.after > 0 {
            lines.push(format!("✈️ Return: {}", fmt_date(ret)));
        }

        Some(lines.join("\n"))
    }
}

fn shift(date: Option<NaiveDate>) -> WolfStreetResult<NaiveDate> {
    date.ok_or_else(|| WolfStreetError::Validation("Travel days move the date out of range".into()))
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(SUMMARY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expand_widens_range_on_both_sides() {
        let travel = TravelDays::new(1, 2);
        let (start, end) = travel.expand(date(2025, 6, 10), date(2025, 6, 12)).unwrap();
        assert_eq!(start, date(2025, 6, 9));
        assert_eq!(end, date(2025, 6, 14));
        assert_eq!(
            travel.contract(start, end).unwrap(),
            (date(2025, 6, 10), date(2025, 6, 12))
        );
    }

    #[test]
    fn expand_crosses_month_boundaries() {
        let travel = TravelDays::new(2, 1);
        let (start, end) = travel.expand(date(2025, 3, 1), date(2025, 3, 31)).unwrap();
        assert_eq!(start, date(2025, 2, 27));
        assert_eq!(end, date(2025, 4, 1));
    }

    #[test]
    fn summary_lists_travel_conference_and_return() {
        let summary = TravelDays::new(1, 2)
            .summary(date(2025, 6, 10), date(2025, 6, 12))
            .unwrap();

        assert_eq!(
            summary,
            "✈️ Travel: Jun 9, 2025\n📍 Conference: Jun 10, 2025 - Jun 12, 2025\n✈️ Return: Jun 14, 2025"
        );
    }

    #[test]
    fn summary_skips_missing_sides() {
        let summary = TravelDays::new(0, 1)
            .summary(date(2025, 6, 10), date(2025, 6, 10))
            .unwrap();

        assert_eq!(summary, "📍 Conference: Jun 10, 2025\n✈️ Return: Jun 11, 2025");
    }

    #[test]
    fn oversized_travel_is_a_validation_error() {
        let travel = TravelDays::new(u32::MAX, 0);
        let err = travel.expand(date(2025, 6, 10), date(2025, 6, 12)).unwrap_err();
        assert!(matches!(err, WolfStreetError::Validation(_)));
        assert!(travel.summary(date(2025, 6, 10), date(2025, 6, 12)).is_none());

        assert!(TravelDays::new(MAX_TRAVEL_DAYS, MAX_TRAVEL_DAYS).validate().is_ok());
        assert!(TravelDays::new(0, MAX_TRAVEL_DAYS + 1).validate().is_err());
    }

    #[test]
    fn expanding_past_the_calendar_edge_fails() {
        let err = TravelDays::new(0, 1).expand(NaiveDate::MAX, NaiveDate::MAX).unwrap_err();
        assert!(matches!(err, WolfStreetError::Validation(_)));
    }

    #[test]
    fn no_summary_without_travel() {
        assert!(TravelDays::default()
            .summary(date(2025, 6, 10), date(2025, 6, 12))
            .is_none());
    }
}
