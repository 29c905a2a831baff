use super::args::{date_argument, unwrap_arguments};
use super::traits::{Tool, ToolResult};
use crate::nutrition::{MealCategory, NumericField, normalize_meal, parse_number};
use crate::storage::{MealRecord, MealStore};
use async_trait::async_trait;
use chrono::Local;
use serde_json::{Value, json};
use std::fmt::Write;

/// Reference daily intake used for the remaining-calories hint.
const DAILY_CALORIE_GOAL: f64 = 2000.0;

/// Summarize the locally saved meals for a day.
pub struct ViewSummaryTool {
    store: MealStore,
}

impl ViewSummaryTool {
    pub fn new(store: MealStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ViewSummaryTool {
    fn name(&self) -> &str {
        "view_daily_summary"
    }

    fn description(&self) -> &str {
        "Show a summary of meals saved locally for a day, grouped by meal type with calorie totals."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "Date to summarize (YYYY-MM-DD, defaults to today)"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args = unwrap_arguments(args)?;
        let date = date_argument(&args, "date")?;
        let records = self.store.read_day(date)?;
        if records.is_empty() {
            return Ok(ToolResult::ok(format!(
                "No meals logged for {date}\nStart by saying: 'I had [food] for [meal type]'"
            )));
        }

        let entries: Vec<SummaryEntry> = records.iter().map(SummaryEntry::from_record).collect();
        let mut out = format!("Daily summary for {date}\n");

        for category in MealCategory::ALL {
            let group: Vec<&SummaryEntry> = entries
                .iter()
                .filter(|e| e.category == Some(category))
                .collect();
            write_group(&mut out, category.title(), &group);
        }
        let uncategorized: Vec<&SummaryEntry> =
            entries.iter().filter(|e| e.category.is_none()).collect();
        write_group(&mut out, "Other", &uncategorized);

        let total: f64 = entries.iter().map(|e| e.calories).sum();
        let _ = write!(out, "\nTotal meals: {}", entries.len());
        if total > 0.0 {
            let _ = write!(out, "\nTotal calories: ~{total:.0} cal");
            if total > 500.0 && total < 3000.0 {
                let remaining = DAILY_CALORIE_GOAL - total;
                if remaining > 0.0 {
                    let _ = write!(out, "\nRemaining (est.): ~{remaining:.0} cal");
                } else {
                    let _ = write!(out, "\nOver goal (est.): ~{:.0} cal", -remaining);
                }
            }
        }
        let _ = write!(out, "\n\nData stored in: {}", self.store.path_for(date).display());
        Ok(ToolResult::ok(out))
    }
}

struct SummaryEntry {
    time: String,
    category: Option<MealCategory>,
    foods: Vec<String>,
    calories: f64,
}

impl SummaryEntry {
    /// Saved records are free-form, so fall back to a best-effort read when a
    /// record does not normalize.
    fn from_record(record: &MealRecord) -> Self {
        let time = record
            .timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string();

        if let Ok(meal) = normalize_meal(&record.meal_data) {
            return Self {
                time,
                category: Some(meal.category),
                foods: meal.items.iter().map(|i| i.name.clone()).collect(),
                calories: meal.total_calories(),
            };
        }

        let data = &record.meal_data;
        let foods = data
            .get("foods")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Self {
            time,
            category: data
                .get("meal_type")
                .and_then(Value::as_str)
                .and_then(MealCategory::parse_loose),
            foods: foods
                .iter()
                .filter_map(|f| f.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
            calories: foods
                .iter()
                .filter_map(|f| {
                    parse_number(&NumericField::from_json(f.get("calories")), "calories").ok()
                })
                .sum(),
        }
    }
}

fn write_group(out: &mut String, title: &str, entries: &[&SummaryEntry]) {
    if entries.is_empty() {
        return;
    }
    let plural = if entries.len() == 1 { "" } else { "s" };
    let _ = writeln!(out, "\n{title} ({} meal{plural}):", entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let _ = write!(out, "  {}. {}", index + 1, entry.time);
        if !entry.foods.is_empty() {
            let _ = write!(out, " - {}", entry.foods.join(", "));
        }
        if entry.calories > 0.0 {
            let _ = write!(out, " (~{:.0} cal)", entry.calories);
        }
        out.push('\n');
    }
}
