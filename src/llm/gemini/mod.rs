//! Google Gemini provider over the `generateContent` REST endpoint.

use crate::error::LlmError;
use crate::llm::{
    build_provider_client,
    classify::{classify_status, classify_transport},
    tool_protocol::render_tool_result,
    traits::Provider,
    types::{ConversationTurn, ProviderResponse, Role},
};
use async_trait::async_trait;
use reqwest::Client;

mod types;
use types::{Content, GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: Option<&str>, model: Option<&str>) -> Self {
        Self {
            api_key: api_key
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(String::from),
            model: model.unwrap_or(DEFAULT_GEMINI_MODEL).to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_provider_client(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LlmError::InvalidCredential {
                provider: self.name().to_string(),
                message: "GEMINI_API_KEY is not set".to_string(),
            })
    }

    fn build_request(system_prompt: &str, history: &[ConversationTurn]) -> GenerateContentRequest {
        let contents = history
            .iter()
            .map(|turn| match (turn.role, turn.tool_output()) {
                (Role::User, Some(output)) => Content::text(Some("user"), render_tool_result(output)),
                (Role::User, None) => Content::text(Some("user"), turn.content.clone()),
                (Role::Assistant, _) => Content::text(Some("model"), turn.content.clone()),
            })
            .collect();

        GenerateContentRequest {
            system_instruction: (!system_prompt.is_empty())
                .then(|| Content::text(None, system_prompt)),
            contents,
        }
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        )
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<ProviderResponse, LlmError> {
        let api_key = self.api_key()?;
        let request = Self::build_request(system_prompt, history);

        let response = self
            .client
            .post(self.endpoint(api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport(self.name(), &e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport(self.name(), &e))?;
        let parsed = serde_json::from_str::<GenerateContentResponse>(&body);

        if !(200..300).contains(&status) {
            let message = match &parsed {
                Ok(GenerateContentResponse {
                    error: Some(error), ..
                }) => error.message.clone(),
                _ => body,
            };
            return Err(classify_status(self.name(), status, &message));
        }

        let parsed = parsed.map_err(|e| LlmError::Unknown {
            provider: self.name().to_string(),
            message: format!("failed to parse response: {e}"),
        })?;

        if let Some(error) = &parsed.error {
            return Err(classify_status(self.name(), error.code, &error.message));
        }

        let text = parsed.first_text().ok_or_else(|| LlmError::Unknown {
            provider: self.name().to_string(),
            message: "no response candidates returned".to_string(),
        })?;

        Ok(ProviderResponse::text_only(text).with_model(self.model.clone()))
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        self.api_key().map(|_| ())
    }
}
