//! Utility functions and helpers.

pub mod clock;
pub mod http;
pub mod text;

use std::path::Path;

use url::Url;

/// Detection hint for a source: the URL without its query, or the file name.
///
/// Query strings of export links carry access tokens, so they are dropped.
pub fn source_hint(source: &str) -> String {
    if let Ok(mut url) = Url::parse(source) {
        if url.has_host() {
            url.set_query(None);
            url.set_fragment(None);
            return url.to_string();
        }
    }
    Path::new(source)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_hint_url() {
        assert_eq!(
            source_hint("https://ical.booking.com/v1/export?t=secret"),
            "https://ical.booking.com/v1/export"
        );
    }

    #[test]
    fn test_source_hint_path() {
        assert_eq!(source_hint("exports/airbnb-july.ics"), "airbnb-july.ics");
        assert_eq!(source_hint("calendar.ics"), "calendar.ics");
    }
}
