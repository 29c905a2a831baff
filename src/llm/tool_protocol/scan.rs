use serde_json::Value;

/// A delimited span found by [`scan_balanced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span<'a> {
    /// Text between the opening delimiter and its match (exclusive).
    pub inner: &'a str,
    /// Byte offset just past the consumed text.
    pub end: usize,
    pub balanced: bool,
}

/// Scan forward from `start` (just past an `open` delimiter) to the matching `close`.
///
/// Delimiters inside double-quoted strings are ignored and a backslash escapes
/// the next character. An unbalanced scan consumes the rest of the text.
pub(crate) fn scan_balanced(text: &str, start: usize, open: char, close: char) -> Span<'_> {
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            _ if c == open => depth += 1,
            _ if c == close => {
                depth -= 1;
                if depth == 0 {
                    let close_at = start + offset;
                    return Span {
                        inner: &text[start..close_at],
                        end: close_at + c.len_utf8(),
                        balanced: true,
                    };
                }
            }
            _ => {}
        }
    }

    Span {
        inner: &text[start..],
        end: text.len(),
        balanced: false,
    }
}

/// Trim, drop one trailing `;`, trim again.
pub(crate) fn clean_arguments(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_suffix(';').map_or(trimmed, str::trim)
}

pub(crate) fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

/// Turn cleaned argument text into valid JSON text.
///
/// Empty arguments become `{}`; text that does not parse is preserved inside
/// an `{"input": ...}` wrapper for the tool to diagnose.
pub(crate) fn arguments_to_json(cleaned: &str) -> String {
    if cleaned.is_empty() {
        return "{}".to_string();
    }
    if is_valid_json(cleaned) {
        return cleaned.to_string();
    }
    serde_json::json!({ "input": cleaned }).to_string()
}
