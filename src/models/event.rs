//! Raw calendar events and the fields extracted from them.

use std::collections::HashMap;

use crate::utils::text::unescape_text;

/// Property keys read from an event block. Everything else is ignored.
pub mod keys {
    pub const DTSTART: &str = "DTSTART";
    pub const DTEND: &str = "DTEND";
    pub const SUMMARY: &str = "SUMMARY";
    pub const UID: &str = "UID";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const LOCATION: &str = "LOCATION";
    pub const CREATED: &str = "CREATED";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
}

/// Property key to accumulated value, for a single event block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    properties: HashMap<String, String>,
}

impl RawEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Append a folded continuation to an existing property.
    pub fn append(&mut self, key: &str, continuation: &str) {
        if let Some(value) = self.properties.get_mut(key) {
            value.push_str(continuation);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Value of `key` if present and not blank.
    fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawEvent {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Fields pulled from a [`RawEvent`] by direct key lookup.
///
/// Date values are still undecoded tokens; text values have their escapes
/// decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub start: String,
    pub end: String,
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created: Option<String>,
    pub last_modified: Option<String>,
}

impl EventFields {
    /// Extract the known fields.
    ///
    /// Fails with the names of the missing required keys. `UID` is only
    /// required when `require_uid` is set.
    pub fn extract(
        event: &RawEvent,
        require_uid: bool,
    ) -> std::result::Result<Self, Vec<&'static str>> {
        let start = event.non_blank(keys::DTSTART);
        let end = event.non_blank(keys::DTEND);
        let uid = event.non_blank(keys::UID);

        let mut missing = Vec::new();
        if start.is_none() {
            missing.push(keys::DTSTART);
        }
        if end.is_none() {
            missing.push(keys::DTEND);
        }
        if require_uid && uid.is_none() {
            missing.push(keys::UID);
        }

        match (start, end) {
            (Some(start), Some(end)) if missing.is_empty() => Ok(Self {
                start: start.to_string(),
                end: end.to_string(),
                uid: uid.map(str::to_string),
                summary: event.get(keys::SUMMARY).map(unescape_text),
                description: event.get(keys::DESCRIPTION).map(unescape_text),
                location: event
                    .non_blank(keys::LOCATION)
                    .map(unescape_text),
                created: event.non_blank(keys::CREATED).map(str::to_string),
                last_modified: event.non_blank(keys::LAST_MODIFIED).map(str::to_string),
            }),
            _ => Err(missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(pairs: &[(&str, &str)]) -> RawEvent {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_extract_complete() {
        let ev = event(&[
            ("DTSTART", "20250710"),
            ("DTEND", "20250713"),
            ("UID", "X1"),
            ("SUMMARY", "Reserved"),
            ("DESCRIPTION", r"Guest: Jane\nStatus: Confirmed"),
            ("LOCATION", r"Loft\, Old Town"),
            ("X-IGNORED", "whatever"),
        ]);
        let fields = EventFields::extract(&ev, true).unwrap();
        assert_eq!(fields.start, "20250710");
        assert_eq!(fields.end, "20250713");
        assert_eq!(fields.uid.as_deref(), Some("X1"));
        assert_eq!(fields.summary.as_deref(), Some("Reserved"));
        assert_eq!(
            fields.description.as_deref(),
            Some("Guest: Jane\nStatus: Confirmed")
        );
        assert_eq!(fields.location.as_deref(), Some("Loft, Old Town"));
        assert_eq!(fields.created, None);
    }

    #[test]
    fn test_extract_reports_missing() {
        let ev = event(&[("DTSTART", "20250710"), ("UID", "  ")]);
        assert_eq!(
            EventFields::extract(&ev, true).unwrap_err(),
            vec!["DTEND", "UID"]
        );
    }

    #[test]
    fn test_extract_uid_optional() {
        let ev = event(&[("DTSTART", "20250710"), ("DTEND", "20250711")]);
        let fields = EventFields::extract(&ev, false).unwrap();
        assert_eq!(fields.uid, None);
        assert!(EventFields::extract(&ev, true).is_err());
    }

    #[test]
    fn test_append_requires_existing_key() {
        let mut ev = RawEvent::new();
        ev.append("DESCRIPTION", "lost");
        assert!(ev.is_empty());
        ev.insert("DESCRIPTION", "Hello ");
        ev.append("DESCRIPTION", "world");
        assert_eq!(ev.get("DESCRIPTION"), Some("Hello world"));
    }
}
