//! Small text helpers shared by the parser and the error reporting paths.

/// Collapse every run of whitespace (including newlines) to a single space
/// and trim both ends. Applying it twice gives the same result as once.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Return at most `max_chars` characters of `text`, never splitting a
/// UTF-8 codepoint.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
