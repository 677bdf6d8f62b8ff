//! Reference markers embedded in free text.
//!
//! Request form: `[REF: <query>]`. The query is everything up to the first
//! following `]`, trimmed; a marker with no closing bracket runs to the end of
//! the text. Resolved forms:
//!
//! - `[Reference for '<query>': <snippet>]`, optionally followed by
//!   ` (+ N more references)` inside the brackets
//! - `[AI-generated knowledge for '<query>': <text>]`
//! - `[No reference information found for '<query>']`

/// Opening of a reference request
pub const MARKER_OPEN: &str = "[REF:";

/// Opening of a resolved local/web reference annotation
pub const REFERENCE_OPEN: &str = "[Reference for";

/// A marker located in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Byte offset of `[`
    pub start: usize,
    /// Byte offset just past `]` (or the end of the text if unterminated)
    pub end: usize,
    /// Trimmed query text
    pub query: String,
}

/// All markers in `text`, left to right, non-overlapping.
pub fn find_markers(text: &str) -> Vec<Marker> {
    let mut markers = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(MARKER_OPEN) {
        let start = cursor + offset;
        let body_start = start + MARKER_OPEN.len();
        let (body_end, end) = match text[body_start..].find(']') {
            Some(close) => (body_start + close, body_start + close + 1),
            None => (text.len(), text.len()),
        };
        markers.push(Marker {
            start,
            end,
            query: text[body_start..body_end].trim().to_string(),
        });
        cursor = end;
    }

    markers
}

/// Whether `text` still carries an unresolved request
pub fn contains_marker(text: &str) -> bool {
    text.contains(MARKER_OPEN)
}

/// Whether `text` shows a request or an already-resolved reference annotation.
pub fn contains_integration_marker(text: &str) -> bool {
    text.contains(MARKER_OPEN) || text.contains(REFERENCE_OPEN)
}

/// Neutralize request openings inside inserted text so output never re-matches.
pub fn sanitize(text: &str) -> String {
    text.replace(MARKER_OPEN, "[REF -")
}

pub fn format_reference(query: &str, snippet: &str, extra: usize) -> String {
    let mut out = format!("[Reference for '{}': {}", sanitize(query), sanitize(snippet));
    if extra > 0 {
        out.push_str(&format!(" (+ {} more references)", extra));
    }
    out.push(']');
    out
}

pub fn format_generated(query: &str, text: &str) -> String {
    format!(
        "[AI-generated knowledge for '{}': {}]",
        sanitize(query),
        sanitize(text)
    )
}

pub fn format_not_found(query: &str) -> String {
    format!("[No reference information found for '{}']", sanitize(query))
}

/// Replace every marker with the not-found placeholder, without any lookup.
pub fn strip_references(text: &str) -> String {
    let markers = find_markers(text);
    if markers.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for marker in &markers {
        out.push_str(&text[last..marker.start]);
        out.push_str(&format_not_found(&marker.query));
        last = marker.end;
    }
    out.push_str(&text[last..]);
    out
}
