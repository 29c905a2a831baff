use serde::Deserialize;

/// `POST /oauth2/token` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub display_name: String,
    pub full_name: String,
    pub encoded_id: String,
    pub timezone: String,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
}

/// `GET /1/user/-/foods/log/date/{date}.json` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyFoodLog {
    pub foods: Vec<FoodLogEntry>,
    pub summary: NutritionSummary,
    pub goals: Option<NutritionGoals>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoodLogEntry {
    pub log_id: Option<u64>,
    pub logged_food: LoggedFood,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggedFood {
    pub name: String,
    pub amount: f64,
    pub calories: f64,
    pub meal_type_id: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NutritionSummary {
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
    pub protein: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NutritionGoals {
    pub calories: Option<f64>,
}
