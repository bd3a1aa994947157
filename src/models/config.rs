//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

use super::{Platform, PlatformProfile};

/// Rules used when no profile is configured for a platform.
static GENERIC_PROFILE: LazyLock<PlatformProfile> = LazyLock::new(PlatformProfile::generic);

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Parsing and heuristic settings
    #[serde(default)]
    pub parser: ParserConfig,

    /// HTTP fetch behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Booking store location
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    ///
    /// A missing file is not worth a warning; an unreadable one is.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            log::debug!("No config at {:?}, using defaults", path.as_ref());
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.max_concurrent == 0 {
            return Err(AppError::validation("fetch.max_concurrent must be > 0"));
        }
        if self.storage.dir.trim().is_empty() {
            return Err(AppError::validation("storage.dir is empty"));
        }
        if self.storage.file_name.trim().is_empty() {
            return Err(AppError::validation("storage.file_name is empty"));
        }
        self.parser.validate()
    }
}

/// Parser and heuristic settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Skip events without a UID instead of synthesizing an id
    #[serde(default = "defaults::require_uid")]
    pub require_uid: bool,

    /// Guest name used when no rule yields one
    #[serde(default = "defaults::unknown_guest")]
    pub unknown_guest: String,

    /// Platform profiles, in detection order
    #[serde(default = "defaults::profiles")]
    pub profiles: Vec<PlatformProfile>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            require_uid: defaults::require_uid(),
            unknown_guest: defaults::unknown_guest(),
            profiles: defaults::profiles(),
        }
    }
}

impl ParserConfig {
    /// Profile for `platform`, or the generic rules if none is configured.
    pub fn profile(&self, platform: Platform) -> &PlatformProfile {
        self.profiles
            .iter()
            .find(|p| p.platform == platform)
            .unwrap_or(&GENERIC_PROFILE)
    }

    pub fn validate(&self) -> Result<()> {
        if self.unknown_guest.trim().is_empty() {
            return Err(AppError::validation("parser.unknown_guest is empty"));
        }
        if self.profiles.is_empty() {
            return Err(AppError::validation("No platform profiles defined"));
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if !seen.insert(profile.platform) {
                return Err(AppError::validation(format!(
                    "Duplicate profile for platform {}",
                    profile.platform
                )));
            }
            if profile.status_rules.is_empty() {
                return Err(AppError::validation(format!(
                    "Profile {} has no status rules",
                    profile.platform
                )));
            }
            if profile.guest_rules.is_empty() {
                return Err(AppError::validation(format!(
                    "Profile {} has no guest rules",
                    profile.platform
                )));
            }
            if profile.default_property_name.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "Profile {} has an empty default_property_name",
                    profile.platform
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client and fetch behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent source fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Hosts calendars may be fetched from. Empty allows any host.
    #[serde(default = "defaults::allowed_domains")]
    pub allowed_domains: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            allowed_domains: defaults::allowed_domains(),
        }
    }
}

impl FetchConfig {
    /// Whether `host` may be fetched from.
    pub fn is_allowed(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.allowed_domains.is_empty()
            || self
                .allowed_domains
                .iter()
                .any(|d| d.eq_ignore_ascii_case(&host))
    }
}

/// Booking store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the snapshot
    #[serde(default = "defaults::storage_dir")]
    pub dir: String,

    /// Snapshot file name inside `dir`
    #[serde(default = "defaults::storage_file")]
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
            file_name: defaults::storage_file(),
        }
    }
}

mod defaults {
    use super::PlatformProfile;

    // Parser defaults
    pub fn require_uid() -> bool {
        true
    }
    pub fn unknown_guest() -> String {
        "Unknown Guest".into()
    }
    pub fn profiles() -> Vec<PlatformProfile> {
        vec![
            PlatformProfile::airbnb(),
            PlatformProfile::booking_com(),
            PlatformProfile::generic(),
        ]
    }

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; reservcal/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn allowed_domains() -> Vec<String> {
        vec![
            "ical.booking.com".into(),
            "www.airbnb.com".into(),
            "airbnb.com".into(),
            "calendar.google.com".into(),
            "outlook.office365.com".into(),
            "outlook.live.com".into(),
        ]
    }

    // Storage defaults
    pub fn storage_dir() -> String {
        "storage".into()
    }
    pub fn storage_file() -> String {
        "bookings.json".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuestRule;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.fetch.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.fetch.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_profiles() {
        let mut config = Config::default();
        config.parser.profiles.push(PlatformProfile::airbnb());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_guest_rules() {
        let mut config = Config::default();
        config.parser.profiles[1].guest_rules.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [parser]
            require_uid = false

            [fetch]
            allowed_domains = []
            "#,
        )
        .unwrap();
        assert!(!config.parser.require_uid);
        assert_eq!(config.parser.unknown_guest, "Unknown Guest");
        assert_eq!(config.parser.profiles.len(), 3);
        assert!(config.fetch.is_allowed("example.org"));
        assert_eq!(config.storage.file_name, "bookings.json");
    }

    #[test]
    fn load_or_default_reads_file_or_falls_back() {
        let tmp = tempfile::TempDir::new().unwrap();

        let missing = tmp.path().join("missing.toml");
        assert!(Config::load_or_default(&missing).parser.require_uid);

        let broken = tmp.path().join("broken.toml");
        fs::write(&broken, "[parser\nrequire_uid = ").unwrap();
        assert_eq!(Config::load_or_default(&broken).fetch.timeout_secs, 30);

        let good = tmp.path().join("config.toml");
        fs::write(&good, "[fetch]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(Config::load_or_default(&good).fetch.timeout_secs, 5);
    }

    #[test]
    fn toml_round_trip_keeps_rules() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.parser.profiles, config.parser.profiles);
    }

    #[test]
    fn profile_falls_back_to_generic() {
        let mut config = ParserConfig::default();
        config.profiles.retain(|p| p.platform == Platform::Airbnb);
        let profile = config.profile(Platform::BookingCom);
        assert_eq!(profile.platform, Platform::Unknown);
        assert!(matches!(
            profile.guest_rules.first(),
            Some(GuestRule::SummaryLiteral { .. })
        ));
    }

    #[test]
    fn fetch_allow_list_is_case_insensitive() {
        let fetch = FetchConfig::default();
        assert!(fetch.is_allowed("WWW.AIRBNB.COM"));
        assert!(!fetch.is_allowed("evil.example"));
    }
}
