// src/services/heuristics.rs

//! Status and guest-name heuristics.
//!
//! Each platform profile carries ordered rule lists. Every rule either
//! produces a value or passes, and every list ends in a default, so
//! unrecognized vocabularies never fail.
//!
//! Status defaults to `Confirmed` when no rule matches: most reservation
//! summaries are opaque guest strings rather than status keywords, so the
//! absence of a negative signal counts as a booking.

use crate::models::{BookingStatus, GuestRule, PlatformProfile, StatusRule};
use crate::utils::text::{first_line, labeled_value};

impl StatusRule {
    /// Status this rule assigns, if it matches.
    pub fn apply(&self, summary: &str, description: &str) -> Option<BookingStatus> {
        match self {
            StatusRule::SummaryLiteral { literals, status } => {
                summary_matches(summary, literals, false).then_some(*status)
            }
            StatusRule::DescriptionField {
                label,
                equals,
                status,
            } => labeled_value(description, label, &[])
                .filter(|value| value.to_lowercase() == equals.trim().to_lowercase())
                .map(|_| *status),
        }
    }
}

impl GuestRule {
    /// Guest name this rule yields, if any.
    pub fn apply(&self, summary: &str, description: &str) -> Option<String> {
        match self {
            GuestRule::DescriptionLabel { label } => labeled_value(description, label, &[]),
            GuestRule::SummaryLiteral {
                literals,
                name,
                contains,
            } => summary_matches(summary, literals, *contains).then(|| name.clone()),
            GuestRule::FirstDescriptionLine => first_line(description).map(str::to_string),
            GuestRule::Summary { strip_suffixes } => {
                let mut name = summary.trim();
                for suffix in strip_suffixes {
                    if let Some(rest) = name.strip_suffix(suffix.trim()) {
                        name = rest.trim_end();
                    }
                }
                (!name.is_empty()).then(|| name.to_string())
            }
        }
    }
}

/// Case-insensitive summary comparison against a literal list.
fn summary_matches(summary: &str, literals: &[String], contains: bool) -> bool {
    let summary = summary.trim().to_lowercase();
    if summary.is_empty() {
        return false;
    }
    literals.iter().any(|literal| {
        let literal = literal.trim().to_lowercase();
        if contains {
            !literal.is_empty() && summary.contains(&literal)
        } else {
            summary == literal
        }
    })
}

/// Applies one profile's rule lists to an event's text fields.
pub struct HeuristicResolver<'a> {
    profile: &'a PlatformProfile,
    unknown_guest: &'a str,
}

impl<'a> HeuristicResolver<'a> {
    pub fn new(profile: &'a PlatformProfile, unknown_guest: &'a str) -> Self {
        Self {
            profile,
            unknown_guest,
        }
    }

    /// First matching status rule, else `Confirmed`.
    pub fn status(&self, summary: &str, description: &str) -> BookingStatus {
        self.profile
            .status_rules
            .iter()
            .find_map(|rule| rule.apply(summary, description))
            .unwrap_or(BookingStatus::Confirmed)
    }

    /// First non-empty guest rule result, else the unknown-guest placeholder.
    pub fn guest_name(&self, summary: &str, description: &str) -> String {
        self.profile
            .guest_rules
            .iter()
            .filter_map(|rule| rule.apply(summary, description))
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| self.unknown_guest.to_string())
    }
}
