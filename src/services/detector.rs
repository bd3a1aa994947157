//! Platform detection service.
//!
//! Infers which reservation platform exported a calendar, so the matching
//! heuristic profile can be applied.

use crate::ics::tokenizer::split_property;
use crate::models::{Platform, PlatformProfile, keys};

/// Service for detecting the source platform of a calendar.
pub struct PlatformDetector<'a> {
    profiles: &'a [PlatformProfile],
}

impl<'a> PlatformDetector<'a> {
    /// Create a new detector over the given profiles. Profile order is
    /// the tie-break at every detection level.
    pub fn new(profiles: &'a [PlatformProfile]) -> Self {
        Self { profiles }
    }

    /// Detect the platform from a URL/file name hint and the calendar body.
    ///
    /// Checked in order: hint keywords, brand names in the body, typical
    /// SUMMARY values. Falls back to [`Platform::Unknown`].
    pub fn detect(&self, hint: Option<&str>, content: &str) -> Platform {
        if let Some(platform) = hint.and_then(|h| self.match_hint(h)) {
            log::debug!("Detected platform '{}' from hint", platform);
            return platform;
        }

        if let Some(platform) = self.match_content(content) {
            log::debug!("Detected platform '{}' from calendar content", platform);
            return platform;
        }

        if let Some(platform) = self.match_summaries(content) {
            log::debug!("Detected platform '{}' from event summaries", platform);
            return platform;
        }

        log::debug!("Platform not detected, using generic rules");
        Platform::Unknown
    }

    fn match_hint(&self, hint: &str) -> Option<Platform> {
        let hint_lower = hint.to_lowercase();
        self.first_match(|profile| {
            profile
                .hint_contains
                .iter()
                .any(|k| hint_lower.contains(&k.to_lowercase()))
        })
    }

    fn match_content(&self, content: &str) -> Option<Platform> {
        let content_lower = content.to_lowercase();
        self.first_match(|profile| {
            profile
                .content_contains
                .iter()
                .any(|k| content_lower.contains(&k.to_lowercase()))
        })
    }

    fn match_summaries(&self, content: &str) -> Option<Platform> {
        let summaries: Vec<&str> = content
            .lines()
            .filter_map(split_property)
            .filter(|(key, _)| *key == keys::SUMMARY)
            .map(|(_, value)| value.trim())
            .collect();

        if summaries.is_empty() {
            return None;
        }

        self.first_match(|profile| {
            profile
                .summary_signatures
                .iter()
                .any(|sig| summaries.contains(&sig.as_str()))
        })
    }

    fn first_match(&self, predicate: impl Fn(&PlatformProfile) -> bool) -> Option<Platform> {
        self.profiles
            .iter()
            .filter(|p| p.platform != Platform::Unknown)
            .find(|p| predicate(*p))
            .map(|p| p.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParserConfig;

    fn detect(hint: Option<&str>, content: &str) -> Platform {
        let config = ParserConfig::default();
        PlatformDetector::new(&config.profiles).detect(hint, content)
    }

    #[test]
    fn test_hint_takes_precedence() {
        let content = "BEGIN:VCALENDAR\nPRODID:-//Airbnb Inc//Hosting Calendar//EN\nEND:VCALENDAR";
        assert_eq!(
            detect(Some("https://ical.booking.com/v1/export?t=abc"), content),
            Platform::BookingCom
        );
        assert_eq!(
            detect(Some("https://www.airbnb.com/calendar/ical/1.ics"), ""),
            Platform::Airbnb
        );
        assert_eq!(detect(Some("exports/Booking.com-May.ics"), ""), Platform::BookingCom);
    }

    #[test]
    fn test_brand_name_in_content() {
        let content = "BEGIN:VCALENDAR\nPRODID:-//Airbnb Inc//Hosting Calendar//EN\nEND:VCALENDAR";
        assert_eq!(detect(Some("calendar.ics"), content), Platform::Airbnb);

        let content = "BEGIN:VCALENDAR\nPRODID:-//admin.booking.com//EN\nEND:VCALENDAR";
        assert_eq!(detect(None, content), Platform::BookingCom);
    }

    #[test]
    fn test_summary_signatures() {
        let content = "BEGIN:VEVENT\nSUMMARY:Reserved\nEND:VEVENT";
        assert_eq!(detect(None, content), Platform::Airbnb);

        let content = "BEGIN:VEVENT\nSUMMARY: Booked \nEND:VEVENT";
        assert_eq!(detect(None, content), Platform::BookingCom);
    }

    #[test]
    fn test_summary_signatures_are_exact() {
        let content = "BEGIN:VEVENT\nSUMMARY:reserved table\nEND:VEVENT";
        assert_eq!(detect(None, content), Platform::Unknown);
    }

    #[test]
    fn test_unknown_by_default() {
        assert_eq!(detect(None, "BEGIN:VCALENDAR\nEND:VCALENDAR"), Platform::Unknown);
        assert_eq!(detect(Some(""), ""), Platform::Unknown);
    }
}
