//! Date rendering for `{{date}}`, `{{day}}` and output file names.

use chrono::{Local, NaiveDate};

/// Suffix appended to the long date to form the output file name.
pub const OUTPUT_SUFFIX: &str = "_menu.pptx";

/// The day a deck is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckDate(NaiveDate);

impl DeckDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The current local date.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Parse an ISO `YYYY-MM-DD` date.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok().map(Self)
    }

    /// Weekday, month, day and year, e.g. `Sunday, October 18, 2026`.
    pub fn long(&self) -> String {
        self.0.format("%A, %B %d, %Y").to_string()
    }

    /// Weekday name, e.g. `Sunday`.
    pub fn weekday(&self) -> String {
        self.0.format("%A").to_string()
    }

    /// File name for a deck generated on this date.
    pub fn output_file_name(&self) -> String {
        format!("{}{}", self.long(), OUTPUT_SUFFIX)
    }
}
