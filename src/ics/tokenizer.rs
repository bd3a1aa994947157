// src/ics/tokenizer.rs

//! Line unfolding and event grouping.
//!
//! Turns calendar text into one [`RawEvent`] per complete
//! `BEGIN:VEVENT`/`END:VEVENT` block. Never fails: lines that are not
//! `KEY[;params]:VALUE` are skipped.

use crate::models::RawEvent;

const EVENT_BEGIN: &str = "BEGIN:VEVENT";
const EVENT_END: &str = "END:VEVENT";
const COMPONENT_BEGIN: &str = "BEGIN:";
const COMPONENT_END: &str = "END:";

/// Event block being accumulated.
struct OpenEvent {
    event: RawEvent,
    /// Key that folded continuation lines extend
    last_key: Option<String>,
    /// Depth inside nested components such as `VALARM`
    nested: usize,
}

impl OpenEvent {
    fn new() -> Self {
        Self {
            event: RawEvent::new(),
            last_key: None,
            nested: 0,
        }
    }

    fn feed(&mut self, line: &str) {
        if self.nested > 0 {
            if line.starts_with(COMPONENT_BEGIN) {
                self.nested += 1;
            } else if line.starts_with(COMPONENT_END) {
                self.nested -= 1;
            }
            return;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some(key) = &self.last_key {
                self.event.append(key, continuation);
            }
            return;
        }

        // Properties of nested components never reach the event.
        if line.starts_with(COMPONENT_BEGIN) {
            self.nested = 1;
            self.last_key = None;
            return;
        }

        if let Some((key, value)) = split_property(line) {
            self.event.insert(key, value);
            self.last_key = Some(key.to_string());
        }
    }
}

/// Normalize line endings to `\n`.
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split a content line into key and value.
///
/// Parameters (`;TZID=...`) are dropped. The value starts after the first
/// colon outside a double-quoted parameter value.
pub fn split_property(line: &str) -> Option<(&str, &str)> {
    let name_end = line.find([';', ':'])?;
    let key = &line[..name_end];
    if key.trim().is_empty() {
        return None;
    }

    if line[name_end..].starts_with(':') {
        return Some((key, &line[name_end + 1..]));
    }

    let mut in_quotes = false;
    for (i, c) in line[name_end..].char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some((key, &line[name_end + i + 1..])),
            _ => {}
        }
    }
    None
}

/// Group calendar text into raw events.
pub fn tokenize(text: &str) -> Vec<RawEvent> {
    let text = normalize_line_endings(text);
    let mut events = Vec::new();
    let mut current: Option<OpenEvent> = None;

    for line in text.split('\n') {
        let marker = line.trim_end();

        if marker == EVENT_BEGIN {
            if current.is_some() {
                log::debug!("Discarding unterminated event block");
            }
            current = Some(OpenEvent::new());
        } else if marker == EVENT_END {
            if let Some(open) = current.take() {
                events.push(open.event);
            }
        } else if let Some(open) = current.as_mut() {
            open.feed(line);
        }
    }

    if current.is_some() {
        log::debug!("Discarding unterminated event block at end of input");
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_property() {
        assert_eq!(split_property("UID:abc"), Some(("UID", "abc")));
        assert_eq!(
            split_property("DTSTART;VALUE=DATE:20250710"),
            Some(("DTSTART", "20250710"))
        );
        assert_eq!(
            split_property(r#"DTSTART;TZID="Europe/Paris:x":20250710T120000"#),
            Some(("DTSTART", "20250710T120000"))
        );
        assert_eq!(
            split_property("DESCRIPTION:Check-in: 15:00"),
            Some(("DESCRIPTION", "Check-in: 15:00"))
        );
        assert_eq!(split_property("no separator here"), None);
        assert_eq!(split_property(":orphan"), None);
        assert_eq!(split_property("X-PARAM;UNTERMINATED"), None);
    }

    #[test]
    fn test_groups_events() {
        let text = "BEGIN:VCALENDAR\r\n\
                    PRODID:-//Test//EN\r\n\
                    BEGIN:VEVENT\r\n\
                    UID:1\r\n\
                    END:VEVENT\r\n\
                    BEGIN:VEVENT\r\n\
                    UID:2\r\n\
                    END:VEVENT\r\n\
                    END:VCALENDAR\r\n";
        let events = tokenize(text);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].get("UID"), Some("1"));
        assert_eq!(events[1].get("UID"), Some("2"));
        assert_eq!(events[0].get("PRODID"), None);
    }

    #[test]
    fn test_folded_lines_are_joined() {
        let text = "BEGIN:VEVENT\n\
                    DESCRIPTION:Guest: Jane\n \
                    Doe\n\
                    \tand family\n\
                    UID:1\n\
                    END:VEVENT";
        let events = tokenize(text);
        assert_eq!(events[0].get("DESCRIPTION"), Some("Guest: JaneDoeand family"));
        assert_eq!(events[0].get("UID"), Some("1"));
        assert_eq!(events[0].len(), 2);
    }

    #[test]
    fn test_fold_keeps_inner_whitespace() {
        let text = "BEGIN:VEVENT\nSUMMARY:Jane\n  Doe\nEND:VEVENT";
        assert_eq!(tokenize(text)[0].get("SUMMARY"), Some("Jane Doe"));
    }

    #[test]
    fn test_lone_cr_line_endings() {
        let text = "BEGIN:VEVENT\rUID:cr\rEND:VEVENT\r";
        assert_eq!(tokenize(text)[0].get("UID"), Some("cr"));
    }

    #[test]
    fn test_unterminated_event_is_discarded() {
        let text = "BEGIN:VEVENT\nUID:lost\nBEGIN:VEVENT\nUID:kept\nEND:VEVENT\nBEGIN:VEVENT\nUID:tail";
        let events = tokenize(text);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get("UID"), Some("kept"));
    }

    #[test]
    fn test_last_write_wins() {
        let text = "BEGIN:VEVENT\nSUMMARY:first\nSUMMARY:second\nEND:VEVENT";
        assert_eq!(tokenize(text)[0].get("SUMMARY"), Some("second"));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "BEGIN:VEVENT\nthis line has no colon\nUID:ok\nEND:VEVENT";
        let events = tokenize(text);
        assert_eq!(events[0].len(), 1);
    }

    #[test]
    fn test_nested_components_do_not_leak() {
        let text = "BEGIN:VEVENT\n\
                    DESCRIPTION:Stay details\n\
                    BEGIN:VALARM\n\
                    DESCRIPTION:Reminder\n \
                    continued\n\
                    END:VALARM\n\
                    UID:1\n\
                    END:VEVENT";
        let events = tokenize(text);
        assert_eq!(events[0].get("DESCRIPTION"), Some("Stay details"));
        assert_eq!(events[0].get("UID"), Some("1"));
    }

    #[test]
    fn test_continuation_outside_event_is_ignored() {
        let text = " stray\nBEGIN:VEVENT\n continuation before any key\nUID:1\nEND:VEVENT";
        let events = tokenize(text);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].len(), 1);
    }
}
