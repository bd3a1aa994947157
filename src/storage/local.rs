//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml           # Importer configuration
//! └── bookings.json         # Current snapshot (written atomically)
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::{BookingSnapshot, BookingStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    file_name: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Create a LocalStorage from configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.dir, &config.file_name)
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.path(&self.file_name)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BookingStorage for LocalStorage {
    async fn write_snapshot(&self, snapshot: &BookingSnapshot) -> Result<WriteMetadata> {
        self.write_json(&self.file_name, snapshot).await?;
        let location = self.snapshot_path().display().to_string();
        log::info!("{} bookings written to {}", snapshot.count, location);

        Ok(WriteMetadata {
            count: snapshot.count,
            location,
            timestamp: Utc::now(),
        })
    }

    async fn load_snapshot(&self) -> Result<Option<BookingSnapshot>> {
        let snapshot = self.read_json::<BookingSnapshot>(&self.file_name).await?;
        if snapshot.is_none() {
            log::debug!("No snapshot at {}", self.snapshot_path().display());
        }
        Ok(snapshot)
    }

    async fn clear(&self) -> Result<bool> {
        match tokio::fs::remove_file(self.snapshot_path()).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, BookingStatus, Platform};
    use chrono::{DateTime, NaiveDate};
    use tempfile::TempDir;

    fn booking(id: &str, day: u32) -> Booking {
        let ts = DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Booking {
            id: id.to_string(),
            platform: Platform::BookingCom,
            property_name: "Harbour Flat".to_string(),
            guest_name: "Maria Garcia".to_string(),
            description: None,
            check_in_date: NaiveDate::from_ymd_opt(2025, 7, day).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2025, 7, day + 2).unwrap(),
            status: BookingStatus::Confirmed,
            original_status: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn storage(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(tmp.path(), "bookings.json")
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        assert!(storage.load_snapshot().await.unwrap().is_none());
        assert!(storage.load_bookings().await.unwrap().is_empty());
        assert!(!storage.clear().await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        let snapshot =
            BookingSnapshot::new(vec![booking("b", 10), booking("a", 1)], Vec::new(), Utc::now());
        let meta = storage.write_snapshot(&snapshot).await.unwrap();
        assert_eq!(meta.count, 2);

        let loaded = storage.load_snapshot().await.unwrap().unwrap();
        assert_eq!(loaded.count, 2);
        assert_eq!(loaded.bookings[0].id, "a");
        assert_eq!(loaded.bookings, snapshot.bookings);
    }

    #[tokio::test]
    async fn test_record_helpers() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        storage.upsert_booking(booking("a", 5)).await.unwrap();
        let mut changed = booking("a", 5);
        changed.guest_name = "Paul Martin".to_string();
        storage.upsert_booking(changed).await.unwrap();
        storage.upsert_booking(booking("b", 1)).await.unwrap();

        let bookings = storage.load_bookings().await.unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].id, "b");

        let a = storage.get_booking("a").await.unwrap().unwrap();
        assert_eq!(a.guest_name, "Paul Martin");

        assert!(storage.delete_booking("a").await.unwrap());
        assert!(!storage.delete_booking("a").await.unwrap());
        assert!(storage.get_booking("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        storage.upsert_booking(booking("a", 5)).await.unwrap();
        assert!(storage.clear().await.unwrap());
        assert!(storage.load_snapshot().await.unwrap().is_none());
    }
}
