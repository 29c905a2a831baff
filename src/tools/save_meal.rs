use super::args::{date_argument, unwrap_arguments};
use super::traits::{Tool, ToolResult};
use crate::storage::{MealRecord, MealStore};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Save meal data to the local per-day history.
pub struct SaveMealTool {
    store: MealStore,
}

impl SaveMealTool {
    pub fn new(store: MealStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SaveMealTool {
    fn name(&self) -> &str {
        "save_meal_locally"
    }

    fn description(&self) -> &str {
        "Save meal data to local file storage. Use when Fitbit is unavailable or as a backup."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "meal_data": {
                    "type": "object",
                    "description": "Complete meal data to save (same shape as fitbit_log_meal)"
                },
                "date": {
                    "type": "string",
                    "description": "Date for the meal (YYYY-MM-DD, defaults to today)"
                }
            },
            "required": ["meal_data"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args = unwrap_arguments(args)?;
        let meal_data = match args.get("meal_data") {
            Some(data @ Value::Object(_)) => data.clone(),
            Some(_) => anyhow::bail!("'meal_data' must be an object"),
            None => anyhow::bail!("Missing 'meal_data' parameter"),
        };
        let date = date_argument(&args, "date")?;

        let count = self.store.append(MealRecord::new(date, meal_data))?;
        let path = self.store.path_for(date);
        tracing::info!(%date, count, "Saved meal locally");

        Ok(ToolResult::ok(format!(
            "Meal saved locally to {date}\nFile: {}\nTotal meals today: {count}",
            path.display()
        )))
    }
}
