//! Parse results and per-event diagnostics.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Booking, Platform};

/// Why an event block was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Required properties absent or blank
    MissingFields { fields: Vec<String> },

    /// A date token could not be decoded
    InvalidDate {
        field: String,
        value: String,
        message: String,
    },

    /// Decoded check-out precedes check-in
    InvertedRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFields { fields } => {
                write!(f, "missing {}", fields.join(", "))
            }
            SkipReason::InvalidDate {
                field,
                value,
                message,
            } => write!(f, "invalid {field} '{value}': {message}"),
            SkipReason::InvertedRange {
                check_in,
                check_out,
            } => write!(f, "check-out {check_out} before check-in {check_in}"),
        }
    }
}

/// An event block that did not produce a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEvent {
    /// Zero-based position among the complete event blocks
    pub index: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    pub reason: SkipReason,
}

/// Result of parsing one calendar body.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Platform whose rules were applied
    pub platform: Platform,

    /// Number of complete event blocks found
    pub event_count: usize,

    pub bookings: Vec<Booking>,

    pub skipped: Vec<SkippedEvent>,
}

impl ParseOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// "N of M events skipped" style summary line.
    pub fn summary(&self) -> String {
        format!(
            "{} bookings from {} events ({} skipped, platform: {})",
            self.bookings.len(),
            self.event_count,
            self.skipped.len(),
            self.platform
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::MissingFields {
            fields: vec!["DTEND".into(), "UID".into()],
        };
        assert_eq!(reason.to_string(), "missing DTEND, UID");

        let reason = SkipReason::InvalidDate {
            field: "DTSTART".into(),
            value: "2025071".into(),
            message: "unexpected length 7".into(),
        };
        assert_eq!(
            reason.to_string(),
            "invalid DTSTART '2025071': unexpected length 7"
        );
    }

    #[test]
    fn test_summary() {
        let outcome = ParseOutcome {
            platform: Platform::BookingCom,
            event_count: 3,
            bookings: Vec::new(),
            skipped: vec![SkippedEvent {
                index: 1,
                uid: None,
                reason: SkipReason::MissingFields {
                    fields: vec!["UID".into()],
                },
            }],
        };
        assert_eq!(
            outcome.summary(),
            "0 bookings from 3 events (1 skipped, platform: booking.com)"
        );
    }
}
