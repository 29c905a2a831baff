//! Fitbit Web API client and OAuth2 authorization-code login.

pub mod client;
pub mod oauth;
pub mod types;

pub use client::{DEFAULT_API_BASE, FitbitClient};
pub use oauth::{CallbackListener, FitbitAuthenticator, LoginOutcome, authorize_url};
pub use types::{DailyFoodLog, FoodLogEntry, LoggedFood, NutritionSummary, UserProfile};
