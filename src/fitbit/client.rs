use super::types::{DailyFoodLog, ProfileResponse, TokenResponse, UserProfile};
use crate::auth::FitbitCredentials;
use crate::error::{AuthError, RemoteError};
use crate::llm::scrub::sanitize_api_error;
use crate::nutrition::{CanonicalFoodItem, CanonicalMeal};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.fitbit.com";

/// Fitbit's generic "serving" unit.
const SERVING_UNIT_ID: &str = "147";
const VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin client for the Fitbit Web API endpoints the agent uses.
#[derive(Debug, Clone)]
pub struct FitbitClient {
    api_base: String,
    client: Client,
}

impl FitbitClient {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Check that an access token is still accepted.
    pub async fn validate_token(&self, access_token: &str) -> Result<(), RemoteError> {
        let request = self
            .client
            .get(format!("{}/1/user/-/profile.json", self.api_base))
            .bearer_auth(access_token)
            .timeout(VALIDATION_TIMEOUT);
        send(request, "token validation").await.map(|_| ())
    }

    pub async fn profile(&self, access_token: &str) -> Result<UserProfile, RemoteError> {
        let request = self
            .client
            .get(format!("{}/1/user/-/profile.json", self.api_base))
            .bearer_auth(access_token);
        let response = send(request, "failed to fetch profile").await?;
        decode::<ProfileResponse>(response, "failed to fetch profile")
            .await
            .map(|p| p.user)
    }

    pub async fn daily_food_log(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<DailyFoodLog, RemoteError> {
        let url = format!(
            "{}/1/user/-/foods/log/date/{}.json",
            self.api_base,
            date.format("%Y-%m-%d")
        );
        let context = "failed to fetch food log";
        let response = send(self.client.get(url).bearer_auth(access_token), context).await?;
        decode(response, context).await
    }

    /// Log every item of a meal, one request per item, in order.
    ///
    /// Stops at the first failure; items already logged stay logged.
    pub async fn log_meal(
        &self,
        credentials: &FitbitCredentials,
        meal: &CanonicalMeal,
        date: NaiveDate,
    ) -> Result<usize, RemoteError> {
        let meal_type_id = meal.category.fitbit_meal_type_id().to_string();
        for (logged, item) in meal.items.iter().enumerate() {
            self.log_food(credentials, item, &meal_type_id, date)
                .await
                .inspect_err(|_| {
                    tracing::warn!(logged, item = %item.name, "Fitbit logging stopped part-way");
                })?;
        }
        Ok(meal.items.len())
    }

    async fn log_food(
        &self,
        credentials: &FitbitCredentials,
        item: &CanonicalFoodItem,
        meal_type_id: &str,
        date: NaiveDate,
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}/1/user/{}/foods/log.json",
            self.api_base,
            credentials.user_id_or_current()
        );
        let amount = format!("{:.2}", item.quantity);
        let calories = format!("{:.0}", item.calories);
        let date = date.format("%Y-%m-%d").to_string();
        let form = [
            ("foodName", item.name.as_str()),
            ("mealTypeId", meal_type_id),
            ("unitId", SERVING_UNIT_ID),
            ("amount", amount.as_str()),
            ("date", date.as_str()),
            ("calories", calories.as_str()),
        ];

        let request = self
            .client
            .post(url)
            .bearer_auth(&credentials.access_token)
            .form(&form);
        send(request, &format!("failed to log {}", item.name)).await?;
        tracing::debug!(food = %item.name, "Logged food item to Fitbit");
        Ok(())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        redirect_url: &str,
        code: &str,
    ) -> Result<TokenResponse, AuthError> {
        let form = [
            ("client_id", client_id),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_url),
            ("code", code),
        ];
        let response = self
            .client
            .post(format!("{}/oauth2/token", self.api_base))
            .header(
                reqwest::header::AUTHORIZATION,
                basic_auth_header(client_id, client_secret),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::OAuth(sanitize_api_error(&format!("token request failed: {e}"))))?;

        if response.status() != StatusCode::OK {
            return Err(AuthError::TokenExchange {
                status: response.status().as_u16(),
            });
        }
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::OAuth(format!("failed to parse token response: {e}")))
    }
}

pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}

async fn send(request: RequestBuilder, context: &str) -> Result<Response, RemoteError> {
    let response = request.send().await.map_err(|source| RemoteError::Transport {
        context: context.to_string(),
        source,
    })?;

    match response.status() {
        StatusCode::UNAUTHORIZED => Err(RemoteError::Unauthorized),
        status if status.is_success() => Ok(response),
        status => Err(RemoteError::Status {
            context: context.to_string(),
            status: status.as_u16(),
        }),
    }
}

async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, RemoteError> {
    response.json::<T>().await.map_err(|e| RemoteError::Decode {
        context: context.to_string(),
        message: e.to_string(),
    })
}
