use super::number::{NumericField, parse_number};
use super::units::{infer_unit, normalize_unit};
use crate::error::InputError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CATEGORY_KEYS: [&str; 4] = ["meal_type", "mealType", "meal", "meal_category"];
const ITEM_LIST_KEYS: [&str; 5] = ["foods", "toast", "snacks", "items", "food_items"];
const NAME_KEYS: [&str; 4] = ["name", "food_item", "item", "food"];
const QUANTITY_KEYS: [&str; 4] = ["quantity", "amount", "serving", "count"];
const CALORIE_KEYS: [&str; 4] = ["calories", "cals", "cal", "energy"];
const UNIT_KEYS: [&str; 4] = ["unit", "units", "measurement", "size"];
const TIME_KEYS: [&str; 2] = ["meal_time", "time"];
const NOTES_KEYS: [&str; 2] = ["notes", "description"];

/// Largest accepted gap between the summed item calories and a stated total.
pub const CALORIE_TOLERANCE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealCategory {
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    /// Resolve a loose category label, including time-of-day synonyms.
    pub fn parse_loose(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "breakfast" | "morning" | "am" => Some(Self::Breakfast),
            "lunch" | "noon" | "midday" | "afternoon" | "pm" => Some(Self::Lunch),
            "dinner" | "evening" | "night" | "supper" => Some(Self::Dinner),
            "snack" | "snacking" | "treat" | "dessert" => Some(Self::Snack),
            _ => None,
        }
    }

    /// Fitbit `mealTypeId` for this category.
    pub fn fitbit_meal_type_id(self) -> u8 {
        match self {
            Self::Breakfast => 1,
            Self::Lunch => 3,
            Self::Dinner => 4,
            Self::Snack => 7,
        }
    }

    /// Inverse of [`fitbit_meal_type_id`](Self::fitbit_meal_type_id); unknown ids are snacks.
    pub fn from_fitbit_meal_type_id(id: u8) -> Self {
        match id {
            1 => Self::Breakfast,
            3 => Self::Lunch,
            4 => Self::Dinner,
            _ => Self::Snack,
        }
    }

    /// Display label, e.g. `Breakfast`.
    pub fn title(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snack => "Snack",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFoodItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMeal {
    pub category: MealCategory,
    pub items: Vec<CanonicalFoodItem>,
    pub timestamp_label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_date: Option<NaiveDate>,
}

impl CanonicalMeal {
    pub fn total_calories(&self) -> f64 {
        self.items.iter().map(|item| item.calories).sum()
    }

    /// Re-express the meal with the canonical key names.
    ///
    /// Normalizing the result yields the same meal again.
    pub fn to_raw(&self) -> Value {
        let mut raw = Map::new();
        raw.insert("meal_type".into(), Value::String(self.category.to_string()));
        let foods = self
            .items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "name": item.name,
                    "quantity": item.quantity,
                    "unit": item.unit,
                    "calories": item.calories,
                })
            })
            .collect();
        raw.insert("foods".into(), Value::Array(foods));
        raw.insert(
            "meal_time".into(),
            Value::String(self.timestamp_label.clone()),
        );
        if !self.notes.is_empty() {
            raw.insert("notes".into(), Value::String(self.notes.clone()));
        }
        if let Some(date) = self.log_date {
            raw.insert(
                "date".into(),
                Value::String(date.format("%Y-%m-%d").to_string()),
            );
        }
        Value::Object(raw)
    }
}

/// Reduce an inconsistently shaped meal object to a [`CanonicalMeal`].
pub fn normalize_meal(raw: &Value) -> Result<CanonicalMeal, InputError> {
    let Value::Object(fields) = raw else {
        return Err(InputError::NotAnObject(json_kind(raw)));
    };

    let category_label = first_text(fields, &CATEGORY_KEYS).unwrap_or_default();
    let category = MealCategory::parse_loose(&category_label).ok_or_else(|| {
        InputError::InvalidMealCategory {
            got: category_label.clone(),
        }
    })?;

    let entries = collect_entries(fields);
    if entries.is_empty() {
        return Err(InputError::NoFoodItems);
    }

    let items = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_item(entry, index + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let log_date = match first_text(fields, &["date"]) {
        Some(text) => Some(NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
            InputError::InvalidDate {
                value: text.clone(),
            }
        })?),
        None => None,
    };

    let meal = CanonicalMeal {
        category,
        items,
        timestamp_label: first_text(fields, &TIME_KEYS).unwrap_or_else(|| "now".to_string()),
        notes: first_text(fields, &NOTES_KEYS).unwrap_or_default(),
        log_date,
    };

    check_total(fields, meal.total_calories())?;
    Ok(meal)
}

fn check_total(fields: &Map<String, Value>, computed: f64) -> Result<(), InputError> {
    let Some(stated) = fields.get("total_calories") else {
        return Ok(());
    };
    match parse_number(&NumericField::from_json(Some(stated)), "total_calories") {
        Ok(expected) if expected > 0.0 => {
            if (computed - expected).abs() > CALORIE_TOLERANCE {
                return Err(InputError::CalorieMismatch { computed, expected });
            }
        }
        Ok(_) => {}
        Err(error) => tracing::warn!("Ignoring unparseable total_calories: {error}"),
    }
    Ok(())
}

fn collect_entries(fields: &Map<String, Value>) -> Vec<&Value> {
    let mut entries = Vec::new();
    for key in ITEM_LIST_KEYS {
        match fields.get(key) {
            Some(Value::Array(list)) => entries.extend(list.iter()),
            Some(single @ Value::Object(_)) => entries.push(single),
            _ => {}
        }
    }
    entries
}

fn normalize_item(entry: &Value, position: usize) -> Result<CanonicalFoodItem, InputError> {
    let Value::Object(fields) = entry else {
        return Err(InputError::MalformedItem { position });
    };

    let name = first_text(fields, &NAME_KEYS).ok_or(InputError::MissingName { position })?;

    let quantity = QUANTITY_KEYS
        .iter()
        .filter_map(|key| parse_field(fields, key))
        .find(|q| *q > 0.0)
        .unwrap_or(1.0);

    let calories = CALORIE_KEYS
        .iter()
        .filter_map(|key| parse_field(fields, key))
        .find(|c| *c >= 0.0)
        .ok_or_else(|| InputError::MissingCalories {
            position,
            name: name.clone(),
        })?;

    let unit = first_text(fields, &UNIT_KEYS)
        .map_or_else(|| infer_unit(&name).to_string(), |u| normalize_unit(&u));

    Ok(CanonicalFoodItem {
        name,
        quantity,
        unit,
        calories,
    })
}

fn parse_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = fields.get(key)?;
    parse_number(&NumericField::from_json(Some(value)), key).ok()
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
