//! Service layer for the booking parser.
//!
//! This module contains the business logic for:
//! - Platform detection (`PlatformDetector`)
//! - Status and guest-name heuristics (`HeuristicResolver`)
//! - Booking assembly (`BookingParser`)

mod detector;
mod heuristics;
mod parser;

pub use detector::PlatformDetector;
pub use heuristics::HeuristicResolver;
pub use parser::BookingParser;
