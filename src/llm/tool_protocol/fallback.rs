//! Secondary call shapes some models produce instead of `TOOL_CALL:`.

use super::RawCall;
use super::scan::{arguments_to_json, clean_arguments, is_valid_json, scan_balanced};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static FENCED_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```tool_call[ \t]*\r?\n\s*(\w+)\s*\(").expect("FENCED_CALL_RE pattern is invalid")
});

static PROSE_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Call\s+(\w+)\s+with\s+\{").expect("PROSE_CALL_RE pattern is invalid")
});

static BARE_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\w+)\(\s*\{").expect("BARE_CALL_RE pattern is invalid")
});

/// ```` ```tool_call ```` fenced block holding `name(args)`.
pub(super) fn fenced_calls(text: &str) -> Vec<RawCall> {
    let mut calls = Vec::new();
    let mut cursor = 0;
    while let Some(caps) = FENCED_CALL_RE.captures_at(text, cursor) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let span = scan_balanced(text, whole.end(), '(', ')');
        calls.push(RawCall {
            name: name.as_str().to_string(),
            arguments: arguments_to_json(clean_arguments(span.inner)),
        });
        cursor = span.end;
    }
    calls
}

/// Prose form: `Call <name> with {...}`.
pub(super) fn prose_calls(text: &str) -> Vec<RawCall> {
    let mut calls = Vec::new();
    let mut cursor = 0;
    while let Some(caps) = PROSE_CALL_RE.captures_at(text, cursor) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        // The match ends just past `{`; keep the brace in the argument text.
        let object_start = whole.end() - 1;
        let span = scan_balanced(text, whole.end(), '{', '}');
        calls.push(RawCall {
            name: name.as_str().to_string(),
            arguments: arguments_to_json(clean_arguments(&text[object_start..span.end])),
        });
        cursor = span.end;
    }
    calls
}

/// Bare `name({...})`, accepted only for registered tools with valid JSON.
pub(super) fn bare_calls(text: &str, known_tools: &HashSet<&str>) -> Vec<RawCall> {
    let mut calls = Vec::new();
    let mut cursor = 0;
    while let Some(caps) = BARE_CALL_RE.captures_at(text, cursor) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let args_start = name.end() + 1;
        if !known_tools.contains(name.as_str()) {
            cursor = args_start;
            continue;
        }

        let span = scan_balanced(text, args_start, '(', ')');
        let cleaned = clean_arguments(span.inner);
        if span.balanced && is_valid_json(cleaned) {
            calls.push(RawCall {
                name: name.as_str().to_string(),
                arguments: cleaned.to_string(),
            });
            cursor = span.end;
        } else {
            tracing::debug!(tool = name.as_str(), "Skipping bare call without valid JSON");
            cursor = whole.end();
        }
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_with_nested_parens() {
        let text = "```tool_call\nfitbit_log_meal({\"notes\": \"(light)\"})\n```";
        let calls = fenced_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "fitbit_log_meal");
        assert_eq!(calls[0].arguments, "{\"notes\": \"(light)\"}");
    }

    #[test]
    fn fenced_block_with_empty_args() {
        let calls = fenced_calls("```tool_call\nfitbit_login()\n```");
        assert_eq!(calls[0].arguments, "{}");
    }

    #[test]
    fn prose_call_keeps_nested_objects() {
        let text = r#"Call fitbit_log_meal with {"meal_type": "lunch", "foods": [{"name": "soup", "calories": 120}]} now."#;
        let calls = prose_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].arguments,
            r#"{"meal_type": "lunch", "foods": [{"name": "soup", "calories": 120}]}"#
        );
    }

    #[test]
    fn bare_call_requires_known_tool_and_json() {
        let known: HashSet<&str> = ["view_daily_summary"].into_iter().collect();
        let text = r#"print({"x": 1}) then view_daily_summary({"date": "2024-01-02"}) and view_daily_summary({bad})"#;
        let calls = bare_calls(text, &known);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "view_daily_summary");
        assert_eq!(calls[0].arguments, r#"{"date": "2024-01-02"}"#);
    }
}
