use crate::error::InputError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static LEADING_FRACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)/(\d+)").expect("LEADING_FRACTION pattern is invalid")
});

static LEADING_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.?\d*|\d*\.\d+)").expect("LEADING_DECIMAL pattern is invalid")
});

const WORD_NUMBERS: [(&str, f64); 19] = [
    ("zero", 0.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("half", 0.5),
    ("quarter", 0.25),
    ("third", 0.33),
    ("couple", 2.0),
    ("few", 3.0),
    ("dozen", 12.0),
    ("pair", 2.0),
    ("single", 1.0),
];

/// A loosely-typed numeric value as it arrives from model-generated JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericField {
    Number(f64),
    Text(String),
    Absent,
    Unsupported(&'static str),
}

impl NumericField {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Unsupported("number"), Self::Number),
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Bool(_)) => Self::Unsupported("boolean"),
            Some(Value::Array(_)) => Self::Unsupported("array"),
            Some(Value::Object(_)) => Self::Unsupported("object"),
        }
    }
}

impl From<f64> for NumericField {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumericField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Reduce a numeric field to an `f64`.
///
/// Text is tried as a plain float first, then as a number word, a leading
/// fraction (`"1/2 cup"`), and finally a leading decimal (`"2 large"`).
pub fn parse_number(value: &NumericField, field: &str) -> Result<f64, InputError> {
    match value {
        NumericField::Number(n) => Ok(*n),
        NumericField::Absent => Err(InputError::MissingNumber {
            field: field.to_string(),
        }),
        NumericField::Unsupported(kind) => Err(InputError::UnsupportedNumberType {
            field: field.to_string(),
            kind,
        }),
        NumericField::Text(text) => parse_text(text, field),
    }
}

fn parse_text(text: &str, field: &str) -> Result<f64, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyNumber {
            field: field.to_string(),
        });
    }

    if let Ok(direct) = trimmed.parse::<f64>() {
        if direct.is_finite() {
            return Ok(direct);
        }
    }

    let lower = trimmed.to_lowercase();
    if let Some((_, n)) = WORD_NUMBERS.iter().find(|(word, _)| *word == lower) {
        return Ok(*n);
    }

    if let Some(caps) = LEADING_FRACTION.captures(&lower) {
        let numerator = caps[1].parse::<f64>().ok();
        let denominator = caps[2].parse::<f64>().ok();
        if let (Some(num), Some(den)) = (numerator, denominator) {
            if den != 0.0 {
                return Ok(num / den);
            }
        }
        return Err(invalid(field, text));
    }

    if let Some(caps) = LEADING_DECIMAL.captures(&lower) {
        if let Ok(n) = caps[1].parse::<f64>() {
            return Ok(n);
        }
    }

    Err(invalid(field, text))
}

fn invalid(field: &str, text: &str) -> InputError {
    InputError::InvalidNumber {
        field: field.to_string(),
        value: text.to_string(),
    }
}
