// src/models/mod.rs

//! Domain models for the booking importer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod booking;
mod config;
mod event;
mod outcome;
mod profile;

// Re-export all public types
pub use booking::{Booking, BookingStatus, DescriptionFields, Platform};
pub use config::{Config, FetchConfig, ParserConfig, StorageConfig};
pub use event::{EventFields, RawEvent, keys};
pub use outcome::{ParseOutcome, SkipReason, SkippedEvent};
pub use profile::{GuestRule, PlatformProfile, StatusRule};
