//! reservcal CLI
//!
//! Imports rental calendar exports into the local booking store and lists
//! what is stored.

use std::path::PathBuf;

use chrono::{Months, NaiveDate};
use clap::{Parser, Subcommand};
use reservcal::{
    error::{AppError, Result},
    models::{Booking, Config, Platform},
    pipeline::{self, CalendarSource, ImportRequest},
    storage::{BookingSnapshot, BookingStorage, LocalStorage},
    utils::http,
};

const LIST_TEMPLATE: &str = "{check_in} .. {check_out}  {nights}n  {guest}  [{platform}, {status}]  {property}  ({id})";

/// reservcal - Rental Calendar Importer
#[derive(Parser, Debug)]
#[command(
    name = "reservcal",
    version,
    about = "Import Airbnb / Booking.com calendar exports into a booking list"
)]
struct Cli {
    /// Path to configuration file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage directory (overrides storage.dir from the config)
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import one or more calendars (URLs or .ics files)
    Import {
        /// Calendar URLs (http, https, webcal) or file paths
        #[arg(required = true)]
        sources: Vec<String>,

        /// Apply this platform's rules instead of detecting it
        #[arg(long)]
        platform: Option<Platform>,

        /// Keep stored bookings missing from these sources
        #[arg(long)]
        merge: bool,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored bookings
    Show {
        /// Only bookings covering this day (YYYY-MM-DD)
        #[arg(long, conflicts_with = "month")]
        date: Option<NaiveDate>,

        /// Only bookings touching this month (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,

        /// Print JSON instead of one line per booking
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate,

    /// Show current snapshot info
    Info,

    /// Delete the stored snapshot
    Clear,
}

/// First day of a `YYYY-MM` month.
fn parse_month(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM, got '{}'", value))
}

/// Last day of the month starting at `first`.
fn month_end(first: NaiveDate) -> Result<NaiveDate> {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::validation(format!("month out of range: {}", first)))
}

/// Bookings touching the requested day or month; all when neither is given.
fn select_bookings(
    snapshot: &BookingSnapshot,
    date: Option<NaiveDate>,
    month: Option<NaiveDate>,
) -> Result<Vec<Booking>> {
    let range = match (date, month) {
        (Some(day), _) => Some((day, day)),
        (None, Some(first)) => Some((first, month_end(first)?)),
        (None, None) => None,
    };
    Ok(match range {
        Some((start, end)) => snapshot.in_range(start, end).cloned().collect(),
        None => snapshot.bookings.clone(),
    })
}

/// Leading part of a fingerprint for display.
fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_bookings(bookings: &[Booking], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bookings)?);
        return Ok(());
    }
    for booking in bookings {
        println!("{}", booking.format(LIST_TEMPLATE));
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load configuration
    let config_path = match (&cli.config, &cli.storage_dir) {
        (Some(path), _) => path.clone(),
        (None, Some(dir)) => dir.join("config.toml"),
        (None, None) => PathBuf::from(Config::default().storage.dir).join("config.toml"),
    };
    let mut config = Config::load_or_default(&config_path);
    if let Some(dir) = &cli.storage_dir {
        config.storage.dir = dir.display().to_string();
    }

    let storage = LocalStorage::from_config(&config.storage);

    match cli.command {
        Command::Import {
            sources,
            platform,
            merge,
            dry_run,
        } => {
            config.validate()?;
            let request = ImportRequest {
                sources: sources.iter().map(|s| CalendarSource::parse(s)).collect(),
                platform,
                merge,
                dry_run,
            };

            let client = http::create_async_client(&config.fetch)?;
            let summary = pipeline::run_import(&config, &storage, &client, &request).await?;

            log::info!(
                "Imported {} bookings from {} events ({} skipped); {}/{} sources ok",
                summary.bookings.len(),
                summary.event_count,
                summary.skipped_count,
                summary.source_total - summary.source_failures,
                summary.source_total
            );
            log::info!(
                "Changes: {} added, {} updated, {} removed",
                summary.diff.added.len(),
                summary.diff.updated.len(),
                summary.diff.removed.len()
            );
            match &summary.written {
                Some(meta) => log::info!("Saved {} bookings to {}", meta.count, meta.location),
                None => log::info!("Dry run, nothing saved"),
            }
        }

        Command::Show { date, month, json } => {
            let selected = match storage.load_snapshot().await? {
                Some(snapshot) => select_bookings(&snapshot, date, month)?,
                None => Vec::new(),
            };

            if selected.is_empty() && !json {
                log::info!("No bookings found.");
            } else {
                print_bookings(&selected, json)?;
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} platform profiles)",
                config.parser.profiles.len()
            );
        }

        Command::Info => {
            log::info!("Storage: {}", storage.snapshot_path().display());

            match storage.load_snapshot().await? {
                Some(snapshot) => {
                    log::info!("Bookings: {}", snapshot.count);
                    log::info!("Last updated: {}", snapshot.updated_at.to_rfc3339());
                    for source in &snapshot.sources {
                        log::info!(
                            "  {} [{}]: {} bookings, {} skipped, sha256 {}",
                            source.source,
                            source.platform,
                            source.booking_count,
                            source.skipped,
                            short_fingerprint(&source.fingerprint)
                        );
                    }
                }
                None => log::info!("No snapshot found yet."),
            }
        }

        Command::Clear => {
            if storage.clear().await? {
                log::info!("Removed {}", storage.snapshot_path().display());
            } else {
                log::info!("Nothing to clear.");
            }
        }
    }

    Ok(())
}
