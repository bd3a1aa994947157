// src/services/parser.rs

//! Booking parser service.
//!
//! Turns calendar text into booking records. Bad events are skipped and
//! reported; only a body without any calendar fails the whole call.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::ics::{self, IcsDate};
use crate::models::{
    Booking, EventFields, ParseOutcome, ParserConfig, Platform, PlatformProfile, RawEvent,
    SkipReason, SkippedEvent, keys,
};
use crate::services::{HeuristicResolver, PlatformDetector};
use crate::utils::clock::{Clock, IdGenerator, RandomIdGenerator, SystemClock};

/// Service for parsing calendar exports into bookings.
pub struct BookingParser {
    config: ParserConfig,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl BookingParser {
    /// Create a parser using the wall clock and random synthesized ids.
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            clock: Box::new(SystemClock),
            ids: Box::new(RandomIdGenerator),
        }
    }

    /// Replace the clock used for missing timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the generator used for events without a UID.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Detect the platform of a calendar body.
    pub fn detect_platform(&self, hint: Option<&str>, content: &str) -> Platform {
        PlatformDetector::new(&self.config.profiles).detect(hint, content)
    }

    /// Parse a calendar body, detecting the platform from `hint` and content.
    pub fn parse(&self, text: &str, hint: Option<&str>) -> Result<ParseOutcome> {
        let calendar = ics::extract_calendar(text)?;
        let platform = self.detect_platform(hint, calendar);
        Ok(self.assemble(&ics::tokenize(calendar), platform))
    }

    /// Parse a calendar body with a known platform.
    pub fn parse_as(&self, text: &str, platform: Platform) -> Result<ParseOutcome> {
        let calendar = ics::extract_calendar(text)?;
        Ok(self.assemble(&ics::tokenize(calendar), platform))
    }

    /// Build bookings from already tokenized events.
    pub fn assemble(&self, events: &[RawEvent], platform: Platform) -> ParseOutcome {
        let profile = self.config.profile(platform);
        let now = self.clock.now();

        let mut outcome = ParseOutcome {
            platform,
            event_count: events.len(),
            ..ParseOutcome::default()
        };

        for (index, event) in events.iter().enumerate() {
            match self.build_booking(event, profile, platform, now) {
                Ok(booking) => outcome.bookings.push(booking),
                Err(reason) => {
                    let uid = event
                        .get(keys::UID)
                        .map(str::trim)
                        .filter(|u| !u.is_empty())
                        .map(str::to_string);
                    log::warn!(
                        "Skipping event {} ({}): {}",
                        index,
                        uid.as_deref().unwrap_or("no UID"),
                        reason
                    );
                    outcome.skipped.push(SkippedEvent { index, uid, reason });
                }
            }
        }

        log::debug!("{}", outcome.summary());
        outcome
    }

    fn build_booking(
        &self,
        event: &RawEvent,
        profile: &PlatformProfile,
        platform: Platform,
        now: DateTime<Utc>,
    ) -> std::result::Result<Booking, SkipReason> {
        let fields = EventFields::extract(event, self.config.require_uid).map_err(|missing| {
            SkipReason::MissingFields {
                fields: missing.iter().map(|f| f.to_string()).collect(),
            }
        })?;

        let check_in_date = ics::check_in_date(&fields.start)
            .map_err(|e| invalid_date(keys::DTSTART, &fields.start, e))?;
        let check_out_date = ics::check_out_date(&fields.end)
            .map_err(|e| invalid_date(keys::DTEND, &fields.end, e))?;

        if check_out_date < check_in_date {
            return Err(SkipReason::InvertedRange {
                check_in: check_in_date,
                check_out: check_out_date,
            });
        }

        let summary = fields.summary.as_deref().unwrap_or("");
        let description = fields.description.as_deref().unwrap_or("");
        let resolver = HeuristicResolver::new(profile, &self.config.unknown_guest);
        let status = resolver.status(summary, description);
        let guest_name = resolver.guest_name(summary, description);

        let id = match fields.uid {
            Some(uid) => uid,
            None => self.ids.next_id(platform, now),
        };

        Ok(Booking {
            id,
            platform,
            property_name: fields
                .location
                .unwrap_or_else(|| profile.default_property_name.clone()),
            guest_name,
            description: fields.description.filter(|d| !d.is_empty()),
            check_in_date,
            check_out_date,
            status,
            original_status: fields.summary,
            created_at: timestamp_or(fields.created.as_deref(), now),
            updated_at: timestamp_or(fields.last_modified.as_deref(), now),
        })
    }
}

impl Default for BookingParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

fn invalid_date(field: &str, value: &str, error: ics::DateError) -> SkipReason {
    SkipReason::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
        message: error.to_string(),
    }
}

/// Decoded timestamp, or `fallback` when absent or undecodable.
fn timestamp_or(token: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    token
        .and_then(|t| IcsDate::parse(t).ok())
        .map(|d| d.to_utc())
        .unwrap_or(fallback)
}
