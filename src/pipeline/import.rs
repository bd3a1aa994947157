// src/pipeline/import.rs

//! Calendar import pipeline.
//!
//! Fetches every source (bounded concurrency), parses each body, merges the
//! results and replaces the stored snapshot.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::{Booking, Config, Platform};
use crate::pipeline::diff::{BookingDiff, calculate_diff};
use crate::services::BookingParser;
use crate::storage::{BookingSnapshot, BookingStorage, SourceRecord, WriteMetadata, sort_bookings};
use crate::utils::{http, source_hint};

/// Where a calendar body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarSource {
    /// `http(s)://` or `webcal://` link
    Url(String),
    /// Local `.ics` file
    File(PathBuf),
}

impl CalendarSource {
    /// Classify a command-line argument.
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        let lower = source.to_lowercase();
        if ["http://", "https://", "webcal://"]
            .iter()
            .any(|scheme| lower.starts_with(scheme))
        {
            CalendarSource::Url(source.to_string())
        } else {
            CalendarSource::File(PathBuf::from(source))
        }
    }

    /// Detection hint: URL without query, or the file name.
    pub fn hint(&self) -> String {
        match self {
            CalendarSource::Url(url) => source_hint(url),
            CalendarSource::File(path) => source_hint(&path.to_string_lossy()),
        }
    }

    /// Name recorded in the snapshot. Never includes URL query strings.
    pub fn label(&self) -> String {
        match self {
            CalendarSource::Url(url) => source_hint(url),
            CalendarSource::File(path) => path.display().to_string(),
        }
    }

    /// Fetch or read the calendar body.
    pub async fn load(&self, client: &reqwest::Client, config: &Config) -> Result<String> {
        match self {
            CalendarSource::Url(url) => http::fetch_calendar(client, &config.fetch, url).await,
            CalendarSource::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

impl fmt::Display for CalendarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// What to import and how to store it.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub sources: Vec<CalendarSource>,
    /// Skip detection and apply this platform's rules
    pub platform: Option<Platform>,
    /// Keep stored bookings that the new import does not mention
    pub merge: bool,
    /// Compute everything but do not write
    pub dry_run: bool,
}

/// Result of an import run.
#[derive(Debug)]
pub struct ImportSummary {
    pub source_total: usize,
    pub source_failures: usize,
    /// Per-source results for the sources that parsed
    pub sources: Vec<SourceRecord>,
    /// Events seen across all parsed sources
    pub event_count: usize,
    pub skipped_count: usize,
    /// Final booking set
    pub bookings: Vec<Booking>,
    /// Stored set versus final set
    pub diff: BookingDiff,
    /// `None` for dry runs
    pub written: Option<WriteMetadata>,
}

/// SHA-256 of a calendar body, hex encoded.
pub fn fingerprint(body: &str) -> String {
    hex::encode(Sha256::digest(body.as_bytes()))
}

/// Run an import with a parser built from `config`.
pub async fn run_import(
    config: &Config,
    storage: &dyn BookingStorage,
    client: &reqwest::Client,
    request: &ImportRequest,
) -> Result<ImportSummary> {
    let parser = BookingParser::new(config.parser.clone());
    run_import_with(&parser, config, storage, client, request).await
}

/// Run an import with the given parser.
pub async fn run_import_with(
    parser: &BookingParser,
    config: &Config,
    storage: &dyn BookingStorage,
    client: &reqwest::Client,
    request: &ImportRequest,
) -> Result<ImportSummary> {
    if request.sources.is_empty() {
        return Err(AppError::validation("No calendar sources given"));
    }

    let concurrency = config.fetch.max_concurrent.max(1);
    log::info!(
        "Importing {} calendar source(s), up to {} at a time",
        request.sources.len(),
        concurrency
    );

    let mut summary = ImportSummary {
        source_total: request.sources.len(),
        source_failures: 0,
        sources: Vec::new(),
        event_count: 0,
        skipped_count: 0,
        bookings: Vec::new(),
        diff: BookingDiff::default(),
        written: None,
    };

    // `buffered` keeps source order, so later sources win on duplicate ids.
    let mut bodies = stream::iter(&request.sources)
        .map(|source| async move { (source, source.load(client, config).await) })
        .buffered(concurrency);

    let mut imported: Vec<Booking> = Vec::new();
    while let Some((source, result)) = bodies.next().await {
        let parsed = result.and_then(|body| {
            let outcome = match request.platform {
                Some(platform) => parser.parse_as(&body, platform)?,
                None => parser.parse(&body, Some(&source.hint()))?,
            };
            Ok((fingerprint(&body), outcome))
        });

        match parsed {
            Ok((fingerprint, outcome)) => {
                log::info!("{}: {}", source, outcome.summary());
                summary.event_count += outcome.event_count;
                summary.skipped_count += outcome.skipped_count();
                summary.sources.push(SourceRecord {
                    source: source.label(),
                    platform: outcome.platform,
                    fingerprint,
                    booking_count: outcome.bookings.len(),
                    skipped: outcome.skipped_count(),
                });
                imported.extend(outcome.bookings);
            }
            Err(error) => {
                summary.source_failures += 1;
                log::warn!("Failed to import {}: {}", source, error);
            }
        }
    }

    if summary.source_failures == summary.source_total {
        return Err(AppError::fetch(
            "import",
            format!("all {} source(s) failed", summary.source_total),
        ));
    }

    let previous = storage.load_snapshot().await?;
    let previous_bookings = previous
        .as_ref()
        .map(|s| s.bookings.as_slice())
        .unwrap_or_default();

    let mut bookings = dedupe_by_id(imported);
    let mut sources = summary.sources.clone();
    if request.merge {
        if let Some(previous) = &previous {
            let kept = previous
                .bookings
                .iter()
                .filter(|old| !bookings.iter().any(|b| b.id == old.id))
                .cloned()
                .collect::<Vec<_>>();
            log::info!("Merge keeps {} stored booking(s)", kept.len());
            bookings.extend(kept);
            sources.extend(
                previous
                    .sources
                    .iter()
                    .filter(|old| !summary.sources.iter().any(|s| s.source == old.source))
                    .cloned(),
            );
        }
    }
    sort_bookings(&mut bookings);

    summary.diff = calculate_diff(previous_bookings, &bookings);
    if summary.diff.has_changes() {
        log::info!(
            "Diff: {} added, {} updated, {} removed",
            summary.diff.added.len(),
            summary.diff.updated.len(),
            summary.diff.removed.len()
        );
    }

    if request.dry_run {
        log::info!("Dry run: {} booking(s) not written", bookings.len());
    } else {
        let snapshot = BookingSnapshot::new(bookings.clone(), sources, Utc::now());
        summary.written = Some(storage.write_snapshot(&snapshot).await?);
    }

    summary.bookings = bookings;
    Ok(summary)
}

/// Keep the last booking for each id.
fn dedupe_by_id(bookings: Vec<Booking>) -> Vec<Booking> {
    let mut by_id: HashMap<String, Booking> = HashMap::new();
    for booking in bookings {
        by_id.insert(booking.id.clone(), booking);
    }
    by_id.into_values().collect()
}
