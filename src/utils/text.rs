// src/utils/text.rs

//! Text helpers shared by the tokenizer and the heuristics.

use regex::Regex;

/// Decode iCalendar TEXT escapes (`\n`, `\N`, `\,`, `\;`, `\\`).
///
/// Unknown escape sequences are kept verbatim.
pub fn unescape_text(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// First line of `text`, trimmed. `None` when that line is blank.
pub fn first_line(text: &str) -> Option<&str> {
    let line = text.lines().next()?.trim();
    (!line.is_empty()).then_some(line)
}

/// Value following `label:` on the same line (case-insensitive label match).
///
/// The value is cut where any of `stop_labels` (followed by a colon) starts,
/// so `Guest: Jane Reservation ID: 42` yields `Jane` for `Guest`.
pub fn labeled_value(text: &str, label: &str, stop_labels: &[&str]) -> Option<String> {
    let pattern = format!(r"(?i)\b{}:[ \t]*([^\r\n]*)", regex::escape(label));
    let caps = Regex::new(&pattern).ok()?.captures(text)?;
    let mut value = caps.get(1)?.as_str();

    if !stop_labels.is_empty() {
        let alternation = stop_labels
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|");
        let stop = Regex::new(&format!(r"(?i)\b(?:{alternation}):")).ok()?;
        if let Some(m) = stop.find(value) {
            value = &value[..m.start()];
        }
    }

    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
