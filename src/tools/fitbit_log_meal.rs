use super::args::{today, unwrap_arguments};
use super::traits::{Tool, ToolResult};
use crate::auth::CredentialStore;
use crate::error::AuthError;
use crate::fitbit::FitbitClient;
use crate::nutrition::{CanonicalMeal, normalize_meal};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use std::fmt::Write;
use std::sync::Arc;

/// Returned instead of an error when Fitbit rejects the stored token.
pub const REAUTH_SUGGESTION: &str = "Authentication expired.

The Fitbit access token is no longer accepted. Re-authenticate with:

TOOL_CALL: fitbit_login({})

Then log the meal again.";

/// Log a meal to Fitbit, one food entry per item.
pub struct FitbitLogMealTool {
    client: FitbitClient,
    credentials: Arc<CredentialStore>,
}

impl FitbitLogMealTool {
    pub fn new(client: FitbitClient, credentials: Arc<CredentialStore>) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl Tool for FitbitLogMealTool {
    fn name(&self) -> &str {
        "fitbit_log_meal"
    }

    fn description(&self) -> &str {
        "Log a meal to Fitbit. Provide the meal type and every food with a quantity, unit and calorie estimate."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "meal_type": {
                    "type": "string",
                    "enum": ["breakfast", "lunch", "dinner", "snack"],
                    "description": "Type of meal"
                },
                "foods": {
                    "type": "array",
                    "description": "Foods in the meal",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string", "description": "Name of the food item"},
                            "quantity": {"type": "number", "description": "Amount eaten"},
                            "unit": {"type": "string", "description": "Unit (cups, slices, oz, ...)"},
                            "calories": {"type": "number", "description": "Estimated calories for this item"}
                        },
                        "required": ["name", "quantity", "unit", "calories"]
                    }
                },
                "meal_time": {
                    "type": "string",
                    "description": "When the meal was eaten (optional, defaults to now)"
                },
                "date": {
                    "type": "string",
                    "description": "Date to log the meal on (YYYY-MM-DD, defaults to today)"
                },
                "notes": {
                    "type": "string",
                    "description": "Additional notes about the meal"
                }
            },
            "required": ["meal_type", "foods"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let args = unwrap_arguments(args)?;
        let meal = normalize_meal(&args)?;

        let credentials = match self.credentials.current() {
            Some(creds) if self.credentials.is_authenticated() => creds,
            _ => {
                return Ok(ToolResult::fail(format!(
                    "{}. Run fitbit_login first to connect your account.",
                    AuthError::NotAuthenticated
                )));
            }
        };

        let date = meal.log_date.unwrap_or_else(today);
        match self.client.log_meal(&credentials, &meal, date).await {
            Ok(count) => {
                tracing::info!(items = count, category = %meal.category, %date, "Logged meal to Fitbit");
                Ok(ToolResult::ok(summarize(&meal)))
            }
            Err(e) if e.is_unauthorized() => Ok(ToolResult::ok(REAUTH_SUGGESTION)),
            Err(e) => Err(e).context("failed to log meal to Fitbit"),
        }
    }
}

fn summarize(meal: &CanonicalMeal) -> String {
    let mut out = format!(
        "Successfully logged {} to Fitbit ({}):\n",
        meal.category, meal.timestamp_label
    );
    for item in &meal.items {
        let _ = writeln!(
            out,
            "- {} ({} {}): ~{:.0} cal",
            item.name,
            format_quantity(item.quantity),
            item.unit,
            item.calories
        );
    }
    let _ = write!(out, "\nTotal: ~{:.0} calories", meal.total_calories());
    if !meal.notes.is_empty() {
        let _ = write!(out, "\nNotes: {}", meal.notes);
    }
    out
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity:.1}")
    }
}
