// src/utils/clock.rs

//! Time and id providers.
//!
//! The parser never reads ambient system time or randomness directly; both
//! come through these traits so tests can pin them.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::models::Platform;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Generator for booking ids when the source event has none.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, platform: Platform, now: DateTime<Utc>) -> String;
}

/// `{platform}-{unix millis}-{8 random hex chars}`. Not stable across imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self, platform: Platform, now: DateTime<Utc>) -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", platform, now.timestamp_millis(), &random[..8])
    }
}

/// `{prefix}-{n}` with a counter starting at 1.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicUsize,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicUsize::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, _platform: Platform, _now: DateTime<Utc>) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let id = RandomIdGenerator.next_id(Platform::BookingCom, now);
        assert!(id.starts_with("booking.com-1700000000000-"));
        assert_eq!(id.rsplit('-').next().unwrap().len(), 8);
    }

    #[test]
    fn test_random_ids_differ() {
        let now = Utc::now();
        let a = RandomIdGenerator.next_id(Platform::Airbnb, now);
        let b = RandomIdGenerator.next_id(Platform::Airbnb, now);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new("evt");
        let now = Utc::now();
        assert_eq!(ids.next_id(Platform::Unknown, now), "evt-1");
        assert_eq!(ids.next_id(Platform::Unknown, now), "evt-2");
    }

    #[test]
    fn test_fixed_clock() {
        let at = DateTime::from_timestamp(42, 0).unwrap();
        assert_eq!(FixedClock(at).now(), at);
    }
}
