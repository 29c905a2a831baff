use super::classify::{classify_status, classify_transport};
use super::http_client::build_provider_client;
use super::tool_protocol::render_tool_result;
use super::traits::Provider;
use super::types::{ConversationTurn, ProviderResponse, Role};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "deepseek-r1:7b";

/// Local models served by Ollama through the single-prompt `/api/generate` endpoint.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaProvider {
    pub fn new(base_url: Option<&str>, model: Option<&str>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_OLLAMA_HOST)
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or(DEFAULT_OLLAMA_MODEL).to_string(),
            client: build_provider_client(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Flatten the conversation into a single transcript prompt.
    fn build_prompt(system_prompt: &str, history: &[ConversationTurn]) -> String {
        let mut prompt = String::new();
        if !system_prompt.is_empty() {
            let _ = write!(prompt, "System: {system_prompt}\n\n");
        }

        for turn in history {
            match (turn.role, turn.tool_output()) {
                (Role::User, Some(output)) => {
                    prompt.push_str(&render_tool_result(output));
                    prompt.push('\n');
                }
                (Role::User, None) => {
                    let _ = writeln!(prompt, "Human: {}", turn.content);
                }
                (Role::Assistant, _) => {
                    let _ = writeln!(prompt, "Assistant: {}", turn.content);
                }
            }
        }

        prompt.push_str("Assistant: ");
        prompt
    }

    fn model_is_pulled(&self, tags: &[ModelTag]) -> bool {
        let wanted = self.model.as_str();
        tags.iter().any(|tag| {
            tag.name == wanted
                || (!wanted.contains(':') && tag.name == format!("{wanted}:latest"))
        })
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<ProviderResponse, LlmError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: Self::build_prompt(system_prompt, history),
            stream: false,
        };
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport(self.name(), &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GenerateResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .unwrap_or(body);
            return Err(classify_status(self.name(), status.as_u16(), &message));
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| LlmError::Unknown {
                provider: self.name().to_string(),
                message: format!("failed to parse response: {e}"),
            })?;

        if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
            return Err(LlmError::Unknown {
                provider: self.name().to_string(),
                message: error,
            });
        }
        if !parsed.done {
            tracing::debug!("Ollama returned an unfinished response");
        }

        Ok(ProviderResponse::text_only(parsed.response).with_model(self.model.clone()))
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            LlmError::ServiceUnavailable {
                provider: self.name().to_string(),
                message: format!(
                    "cannot connect to Ollama at {}: {e}. Is it running? (ollama serve)",
                    self.base_url
                ),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(self.name(), status.as_u16(), &body));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| LlmError::Unknown {
            provider: self.name().to_string(),
            message: format!("failed to parse model list: {e}"),
        })?;

        if self.model_is_pulled(&tags.models) {
            Ok(())
        } else {
            Err(LlmError::InvalidRequest {
                provider: self.name().to_string(),
                message: format!(
                    "model {} not found. Pull it with: ollama pull {}",
                    self.model, self.model
                ),
            })
        }
    }
}
