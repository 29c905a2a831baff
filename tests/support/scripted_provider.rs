#![allow(dead_code)]

use async_trait::async_trait;
use meal_agent::error::LlmError;
use meal_agent::llm::{ConversationTurn, Provider, ProviderResponse};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub type SeenHistories = Arc<Mutex<Vec<Vec<ConversationTurn>>>>;

/// Provider that answers from a fixed script and records every history it receives.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    seen: SeenHistories,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> (Self, SeenHistories)
    where
        I: IntoIterator<Item = Result<S, LlmError>>,
        S: Into<String>,
    {
        let seen: SeenHistories = Arc::new(Mutex::new(Vec::new()));
        let provider = Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
            seen: Arc::clone(&seen),
        };
        (provider, seen)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _system_prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<ProviderResponse, LlmError> {
        self.seen.lock().unwrap().push(history.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Anything else?".to_string()))
            .map(ProviderResponse::text_only)
    }
}
