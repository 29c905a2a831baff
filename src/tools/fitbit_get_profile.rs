use super::args::{date_argument, unwrap_arguments};
use super::fitbit_log_meal::REAUTH_SUGGESTION;
use super::traits::{Tool, ToolResult};
use crate::auth::CredentialStore;
use crate::error::{AuthError, RemoteError};
use crate::fitbit::{DailyFoodLog, FitbitClient, UserProfile};
use crate::nutrition::MealCategory;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::fmt::Write;
use std::sync::Arc;

/// Fetch the Fitbit profile together with the day's food log.
pub struct FitbitGetProfileTool {
    client: FitbitClient,
    credentials: Arc<CredentialStore>,
}

impl FitbitGetProfileTool {
    pub fn new(client: FitbitClient, credentials: Arc<CredentialStore>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    async fn fetch(
        &self,
        token: &str,
        date: NaiveDate,
    ) -> Result<(UserProfile, DailyFoodLog), RemoteError> {
        let profile = self.client.profile(token).await?;
        let log = self.client.daily_food_log(token, date).await?;
        Ok((profile, log))
    }
}

#[async_trait]
impl Tool for FitbitGetProfileTool {
    fn name(&self) -> &str {
        "fitbit_get_profile"
    }

    fn description(&self) -> &str {
        "Get the user's Fitbit profile and daily nutrition progress, including calorie goal and intake so far."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "Date to report on (YYYY-MM-DD, defaults to today)"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args = unwrap_arguments(args)?;
        let date = date_argument(&args, "date")?;

        let credentials = match self.credentials.current() {
            Some(creds) if self.credentials.is_authenticated() => creds,
            _ => {
                return Ok(ToolResult::fail(format!(
                    "{}. Run fitbit_login first to connect your account.",
                    AuthError::NotAuthenticated
                )));
            }
        };

        match self.fetch(&credentials.access_token, date).await {
            Ok((profile, log)) => Ok(ToolResult::ok(render(&profile, &log, date))),
            Err(e) if e.is_unauthorized() => Ok(ToolResult::ok(REAUTH_SUGGESTION)),
            Err(e) => Err(e.into()),
        }
    }
}

fn render(profile: &UserProfile, log: &DailyFoodLog, date: NaiveDate) -> String {
    let name = [&profile.display_name, &profile.full_name]
        .into_iter()
        .find(|n| !n.is_empty())
        .map_or("Fitbit user", String::as_str);
    let mut out = format!("Fitbit profile & daily progress ({date})\nUser: {name}\n");
    if !profile.timezone.is_empty() {
        let _ = writeln!(out, "Timezone: {}", profile.timezone);
    }

    let consumed = log.summary.calories;
    match log.goals.as_ref().and_then(|g| g.calories).filter(|g| *g > 0.0) {
        Some(goal) => {
            let _ = writeln!(
                out,
                "\nCalories: {consumed:.0} / {goal:.0} ({:.0}%)",
                consumed / goal * 100.0
            );
            let _ = writeln!(out, "Remaining: {:.0} cal", goal - consumed);
        }
        None => {
            let _ = writeln!(out, "\nCalories: {consumed:.0}");
        }
    }
    let _ = writeln!(
        out,
        "Protein: {:.0}g  Carbs: {:.0}g  Fat: {:.0}g",
        log.summary.protein, log.summary.carbs, log.summary.fat
    );

    if log.foods.is_empty() {
        out.push_str("\nNo foods logged yet.");
        return out;
    }
    out.push_str("\nMeals:");
    for category in MealCategory::ALL {
        let foods: Vec<_> = log
            .foods
            .iter()
            .filter(|f| MealCategory::from_fitbit_meal_type_id(f.logged_food.meal_type_id) == category)
            .collect();
        if foods.is_empty() {
            continue;
        }
        let calories: f64 = foods.iter().map(|f| f.logged_food.calories).sum();
        let names: Vec<&str> = foods.iter().map(|f| f.logged_food.name.as_str()).collect();
        let _ = write!(
            out,
            "\n- {}: {calories:.0} cal ({})",
            category.title(),
            names.join(", ")
        );
    }
    out
}
