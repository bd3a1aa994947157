//! Diff between the stored booking set and a fresh import.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Booking;

/// Ids that changed between two booking sets. Each list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDiff {
    /// In current but not in previous
    pub added: Vec<String>,
    /// In both with different content
    pub updated: Vec<String>,
    /// In previous but not in current
    pub removed: Vec<String>,
}

impl BookingDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty() || !self.removed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

/// Whether two bookings with the same id carry the same content.
///
/// Timestamps are ignored: exports without CREATED/LAST-MODIFIED get fresh
/// ones on every import.
fn same_content(a: &Booking, b: &Booking) -> bool {
    a.platform == b.platform
        && a.property_name == b.property_name
        && a.guest_name == b.guest_name
        && a.description == b.description
        && a.check_in_date == b.check_in_date
        && a.check_out_date == b.check_out_date
        && a.status == b.status
        && a.original_status == b.original_status
}

/// Calculate the diff between previous and current booking sets.
pub fn calculate_diff(previous: &[Booking], current: &[Booking]) -> BookingDiff {
    let prev_map: HashMap<&str, &Booking> = previous.iter().map(|b| (b.id.as_str(), b)).collect();
    let curr_map: HashMap<&str, &Booking> = current.iter().map(|b| (b.id.as_str(), b)).collect();

    let mut diff = BookingDiff::default();
    for (id, curr) in &curr_map {
        match prev_map.get(id) {
            None => diff.added.push(id.to_string()),
            Some(prev) if !same_content(prev, curr) => diff.updated.push(id.to_string()),
            Some(_) => {}
        }
    }
    diff.removed = prev_map
        .keys()
        .filter(|id| !curr_map.contains_key(*id))
        .map(|id| id.to_string())
        .collect();

    diff.added.sort();
    diff.updated.sort();
    diff.removed.sort();
    diff
}
