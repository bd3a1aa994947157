// src/ics/envelope.rs

//! Calendar envelope checks.
//!
//! Locates the `VCALENDAR` block in a fetched or uploaded body before any
//! tokenizing happens. A body without one is a batch-level format error.

use crate::error::{AppError, Result};

pub const CALENDAR_BEGIN: &str = "BEGIN:VCALENDAR";
pub const CALENDAR_END: &str = "END:VCALENDAR";

/// Remove a leading byte-order marker.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Whether the body mentions a calendar-begin marker anywhere.
pub fn contains_calendar(text: &str) -> bool {
    text.contains(CALENDAR_BEGIN)
}

/// Return the calendar text to tokenize.
///
/// - A body starting with `BEGIN:VCALENDAR` is used whole.
/// - Otherwise the first embedded `BEGIN:VCALENDAR ... END:VCALENDAR` block
///   is used (e.g. a calendar wrapped in an HTML page). An embedded begin
///   marker with no end marker runs to the end of the body.
/// - No begin marker at all is an [`AppError::Format`].
pub fn extract_calendar(text: &str) -> Result<&str> {
    let text = strip_bom(text).trim();
    if text.starts_with(CALENDAR_BEGIN) {
        return Ok(text);
    }

    let begin = text
        .find(CALENDAR_BEGIN)
        .ok_or_else(|| AppError::format("missing BEGIN:VCALENDAR"))?;
    let embedded = &text[begin..];

    log::debug!("Calendar block embedded at byte offset {}", begin);

    Ok(match embedded.find(CALENDAR_END) {
        Some(end) => &embedded[..end + CALENDAR_END.len()],
        None => embedded,
    })
}
