use crate::error::InputError;
use chrono::{Local, NaiveDate};
use serde_json::Value;

const PREVIEW_CHARS: usize = 100;

/// Undo the `{"input": "<text>"}` wrapping the protocol parser applies to
/// arguments that were not valid JSON.
///
/// If the wrapped text is itself valid JSON it replaces the wrapper; otherwise
/// the model most likely emitted a cut-off payload.
pub fn unwrap_arguments(args: Value) -> Result<Value, InputError> {
    let Some(wrapped) = wrapped_input(&args) else {
        return Ok(args);
    };
    serde_json::from_str(wrapped).map_err(|_| InputError::TruncatedArguments {
        preview: preview(wrapped),
    })
}

fn wrapped_input(args: &Value) -> Option<&str> {
    let Value::Object(fields) = args else {
        return None;
    };
    if fields.len() != 1 {
        return None;
    }
    fields
        .get("input")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Optional `YYYY-MM-DD` argument, defaulting to today's local date.
pub fn date_argument(args: &Value, key: &str) -> Result<NaiveDate, InputError> {
    match args.get(key).and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|_| InputError::InvalidDate {
                value: text.to_string(),
            }),
        _ => Ok(today()),
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_objects_pass_through() {
        let args = json!({"meal_type": "lunch", "foods": []});
        assert_eq!(unwrap_arguments(args.clone()).unwrap(), args);
    }

    #[test]
    fn wrapped_json_is_unwrapped() {
        let args = json!({"input": "{\"meal_type\": \"snack\"}"});
        assert_eq!(
            unwrap_arguments(args).unwrap(),
            json!({"meal_type": "snack"})
        );
    }

    #[test]
    fn wrapped_garbage_reports_preview() {
        let long = format!("{{\"meal_type\": \"dinner\", \"foods\": [{}", "x".repeat(200));
        let err = unwrap_arguments(json!({"input": long})).unwrap_err();
        let InputError::TruncatedArguments { preview } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
        assert!(err.to_string().contains("truncated or invalid JSON"));
    }

    #[test]
    fn input_alongside_other_keys_is_not_a_wrapper() {
        let args = json!({"input": "oops", "date": "2024-01-01"});
        assert_eq!(unwrap_arguments(args.clone()).unwrap(), args);
    }

    #[test]
    fn date_argument_defaults_to_today() {
        assert_eq!(date_argument(&json!({}), "date").unwrap(), today());
        assert_eq!(date_argument(&json!({"date": ""}), "date").unwrap(), today());
        assert_eq!(
            date_argument(&json!({"date": "2024-02-29"}), "date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(date_argument(&json!({"date": "yesterday"}), "date").is_err());
    }
}
