//! Pipeline entry points for importer operations.
//!
//! - `run_import`: Fetch calendar sources, parse, diff and store bookings
//! - `calculate_diff`: Compare a stored booking set with a fresh one

pub mod diff;
pub mod import;

pub use diff::{BookingDiff, calculate_diff};
pub use import::{CalendarSource, ImportRequest, ImportSummary, run_import, run_import_with};
