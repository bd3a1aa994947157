// src/ics/date.rs

//! Compact iCalendar date and date-time tokens.
//!
//! Only the basic forms are understood: `YYYYMMDD` and
//! `YYYYMMDDTHHMMSS` with an optional trailing `Z`. Time zones other than
//! the UTC marker are not interpreted; bookings work at day resolution.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

/// Why a date token could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("unexpected length {0}")]
    Length(usize),

    #[error("non-numeric component")]
    NonNumeric,

    #[error("missing 'T' separator")]
    Separator,

    #[error("not a valid calendar date or time")]
    OutOfRange,
}

/// A decoded date token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsDate {
    /// Whole-day value
    Date(NaiveDate),

    /// Date with time of day; `utc` is set for the `Z` form
    DateTime { value: NaiveDateTime, utc: bool },
}

impl IcsDate {
    /// Decode a token such as `20250710` or `20250710T150000Z`.
    pub fn parse(token: &str) -> Result<Self, DateError> {
        let token = token.trim();
        match token.len() {
            8 => Ok(IcsDate::Date(parse_ymd(token)?)),
            15 | 16 => {
                let (body, utc) = match token.strip_suffix('Z') {
                    Some(body) => (body, true),
                    None if token.len() == 15 => (token, false),
                    None => return Err(DateError::NonNumeric),
                };
                if body.as_bytes()[8] != b'T' {
                    return Err(DateError::Separator);
                }
                let date = parse_ymd(&body[..8])?;
                let time = parse_hms(&body[9..])?;
                Ok(IcsDate::DateTime {
                    value: NaiveDateTime::new(date, time),
                    utc,
                })
            }
            other => Err(DateError::Length(other)),
        }
    }

    /// Calendar date, dropping any time of day.
    pub fn date(&self) -> NaiveDate {
        match self {
            IcsDate::Date(date) => *date,
            IcsDate::DateTime { value, .. } => value.date(),
        }
    }

    pub fn is_date_only(&self) -> bool {
        matches!(self, IcsDate::Date(_))
    }

    /// Instant for timestamps. Floating times are read as UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            IcsDate::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
            IcsDate::DateTime { value, .. } => value.and_utc(),
        }
    }
}

/// Check-in date from a start token. Never shifted.
pub fn check_in_date(token: &str) -> Result<NaiveDate, DateError> {
    Ok(IcsDate::parse(token)?.date())
}

/// Check-out date from an end token.
///
/// A date-only end is exclusive, so it moves back one day to the last night
/// of the stay. Date-time ends are used as they are.
pub fn check_out_date(token: &str) -> Result<NaiveDate, DateError> {
    match IcsDate::parse(token)? {
        IcsDate::Date(date) => date.pred_opt().ok_or(DateError::OutOfRange),
        other => Ok(other.date()),
    }
}

fn digits(s: &str) -> Result<u32, DateError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::NonNumeric);
    }
    s.parse().map_err(|_| DateError::NonNumeric)
}

fn parse_ymd(s: &str) -> Result<NaiveDate, DateError> {
    if !s.is_ascii() {
        return Err(DateError::NonNumeric);
    }
    let year = digits(&s[0..4])? as i32;
    let month = digits(&s[4..6])?;
    let day = digits(&s[6..8])?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateError::OutOfRange)
}

fn parse_hms(s: &str) -> Result<NaiveTime, DateError> {
    if s.len() != 6 || !s.is_ascii() {
        return Err(DateError::NonNumeric);
    }
    let hour = digits(&s[0..2])?;
    let minute = digits(&s[2..4])?;
    let second = digits(&s[4..6])?;
    NaiveTime::from_hms_opt(hour, minute, second).ok_or(DateError::OutOfRange)
}
