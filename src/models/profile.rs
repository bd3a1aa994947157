// src/models/profile.rs

//! Per-platform detection patterns and heuristic rule lists.

use serde::{Deserialize, Serialize};

use super::{BookingStatus, Platform};

/// Rule deciding a booking status. Rules are tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusRule {
    /// Trimmed, lowercased summary equals one of `literals`
    SummaryLiteral {
        literals: Vec<String>,
        status: BookingStatus,
    },

    /// Description carries `label: <equals>` (case-insensitive)
    DescriptionField {
        label: String,
        equals: String,
        status: BookingStatus,
    },
}

/// Rule producing a guest display name. Rules are tried in order; the first
/// non-empty result wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuestRule {
    /// Value of a `label:` line in the description
    DescriptionLabel { label: String },

    /// Fixed `name` when the summary matches one of `literals`
    SummaryLiteral {
        literals: Vec<String>,
        name: String,
        /// Substring match instead of equality
        #[serde(default)]
        contains: bool,
    },

    /// First line of the description
    FirstDescriptionLine,

    /// The summary itself, minus trailing decorations
    Summary {
        #[serde(default)]
        strip_suffixes: Vec<String>,
    },
}

/// Detection signatures and extraction rules for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub platform: Platform,

    /// Substrings matched against the source URL or file name
    #[serde(default)]
    pub hint_contains: Vec<String>,

    /// Brand names matched against the calendar body
    #[serde(default)]
    pub content_contains: Vec<String>,

    /// Exact SUMMARY values typical for this platform
    #[serde(default)]
    pub summary_signatures: Vec<String>,

    /// Property name used when an event has no LOCATION
    pub default_property_name: String,

    pub status_rules: Vec<StatusRule>,

    pub guest_rules: Vec<GuestRule>,
}

impl PlatformProfile {
    /// Airbnb hosting calendar exports.
    pub fn airbnb() -> Self {
        Self {
            platform: Platform::Airbnb,
            hint_contains: strings(&["airbnb"]),
            content_contains: strings(&["airbnb"]),
            summary_signatures: strings(&["Reserved", "Confirmed"]),
            default_property_name: "Airbnb Listing".to_string(),
            status_rules: vec![
                negative_summary_rule(),
                confirmed_description_rule(),
                positive_summary_rule(),
            ],
            guest_rules: vec![
                blocked_guest_rule(false),
                guest_label_rule(),
                GuestRule::Summary {
                    strip_suffixes: Vec::new(),
                },
            ],
        }
    }

    /// Booking.com extranet calendar exports.
    pub fn booking_com() -> Self {
        Self {
            platform: Platform::BookingCom,
            hint_contains: strings(&["booking.com", "ical.booking"]),
            content_contains: strings(&["booking.com"]),
            summary_signatures: strings(&["Booked", "Blocked"]),
            default_property_name: "Booking.com Property".to_string(),
            status_rules: vec![negative_summary_rule(), positive_summary_rule()],
            guest_rules: vec![
                blocked_guest_rule(true),
                guest_label_rule(),
                GuestRule::FirstDescriptionLine,
                closed_summary_rule(),
            ],
        }
    }

    /// Rules for calendars whose platform could not be determined.
    pub fn generic() -> Self {
        Self {
            platform: Platform::Unknown,
            hint_contains: Vec::new(),
            content_contains: Vec::new(),
            summary_signatures: Vec::new(),
            default_property_name: "Unknown Property".to_string(),
            status_rules: vec![
                negative_summary_rule(),
                confirmed_description_rule(),
                positive_summary_rule(),
            ],
            guest_rules: vec![
                blocked_guest_rule(false),
                guest_label_rule(),
                GuestRule::FirstDescriptionLine,
                closed_summary_rule(),
            ],
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn negative_summary_rule() -> StatusRule {
    StatusRule::SummaryLiteral {
        literals: strings(&["blocked", "cancelled"]),
        status: BookingStatus::Cancelled,
    }
}

fn positive_summary_rule() -> StatusRule {
    StatusRule::SummaryLiteral {
        literals: strings(&["booked", "reserved", "confirmed"]),
        status: BookingStatus::Confirmed,
    }
}

fn confirmed_description_rule() -> StatusRule {
    StatusRule::DescriptionField {
        label: "Status".to_string(),
        equals: "confirmed".to_string(),
        status: BookingStatus::Confirmed,
    }
}

fn guest_label_rule() -> GuestRule {
    GuestRule::DescriptionLabel {
        label: "Guest".to_string(),
    }
}

fn blocked_guest_rule(contains: bool) -> GuestRule {
    GuestRule::SummaryLiteral {
        literals: strings(&["blocked", "cancelled"]),
        name: "Blocked".to_string(),
        contains,
    }
}

fn closed_summary_rule() -> GuestRule {
    GuestRule::Summary {
        strip_suffixes: strings(&[" - Closed"]),
    }
}
