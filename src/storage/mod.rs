//! Storage abstractions for booking persistence.
//!
//! The store holds a single snapshot: the current booking set plus a record
//! of the calendar sources it was built from.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Optional configuration
//! └── bookings.json         # Current booking snapshot
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Booking, Platform};

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of bookings written
    pub count: usize,
    /// Where the snapshot was written
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// One calendar source that contributed to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    /// URL (query stripped) or file path
    pub source: String,
    pub platform: Platform,
    /// SHA-256 of the fetched body, hex encoded
    pub fingerprint: String,
    pub booking_count: usize,
    pub skipped: usize,
}

/// Persisted booking set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSnapshot {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    /// Total booking count
    pub count: usize,
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
    /// Bookings ordered by check-in date, then id
    pub bookings: Vec<Booking>,
}

impl BookingSnapshot {
    pub fn new(
        mut bookings: Vec<Booking>,
        sources: Vec<SourceRecord>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        sort_bookings(&mut bookings);
        Self {
            updated_at,
            count: bookings.len(),
            sources,
            bookings,
        }
    }

    pub fn empty(updated_at: DateTime<Utc>) -> Self {
        Self::new(Vec::new(), Vec::new(), updated_at)
    }

    /// Bookings whose stay touches `[start, end]`.
    pub fn in_range(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter(move |b| b.overlaps(start, end))
    }
}

/// Order bookings by check-in date, then id.
pub fn sort_bookings(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        a.check_in_date
            .cmp(&b.check_in_date)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Trait for booking storage backends.
#[async_trait]
pub trait BookingStorage: Send + Sync {
    /// Replace the stored snapshot.
    async fn write_snapshot(&self, snapshot: &BookingSnapshot) -> Result<WriteMetadata>;

    /// Load the stored snapshot, if any.
    async fn load_snapshot(&self) -> Result<Option<BookingSnapshot>>;

    /// Remove the stored snapshot. Returns whether one existed.
    async fn clear(&self) -> Result<bool>;

    /// Load stored bookings; empty when nothing is stored.
    async fn load_bookings(&self) -> Result<Vec<Booking>> {
        Ok(self
            .load_snapshot()
            .await?
            .map(|s| s.bookings)
            .unwrap_or_default())
    }

    /// Look up one booking by id.
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self.load_bookings().await?.into_iter().find(|b| b.id == id))
    }

    /// Insert a booking or replace the one with the same id.
    async fn upsert_booking(&self, booking: Booking) -> Result<()> {
        let now = Utc::now();
        let snapshot = self
            .load_snapshot()
            .await?
            .unwrap_or_else(|| BookingSnapshot::empty(now));

        let mut bookings = snapshot.bookings;
        match bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking,
            None => bookings.push(booking),
        }

        self.write_snapshot(&BookingSnapshot::new(bookings, snapshot.sources, now))
            .await?;
        Ok(())
    }

    /// Delete a booking by id. Returns whether it was present.
    async fn delete_booking(&self, id: &str) -> Result<bool> {
        let Some(snapshot) = self.load_snapshot().await? else {
            return Ok(false);
        };

        let before = snapshot.bookings.len();
        let bookings: Vec<Booking> = snapshot
            .bookings
            .into_iter()
            .filter(|b| b.id != id)
            .collect();
        if bookings.len() == before {
            return Ok(false);
        }

        self.write_snapshot(&BookingSnapshot::new(bookings, snapshot.sources, Utc::now()))
            .await?;
        Ok(true)
    }
}
