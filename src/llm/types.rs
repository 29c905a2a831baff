use serde::{Deserialize, Serialize};

/// Prefix marking a user turn that carries a tool's output back to the model.
pub const TOOL_RESULT_LABEL: &str = "Tool result: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn tool_result(output: &str) -> Self {
        Self::user(format!("{TOOL_RESULT_LABEL}{output}"))
    }

    pub fn is_tool_result(&self) -> bool {
        self.role == Role::User && self.content.starts_with(TOOL_RESULT_LABEL)
    }

    /// Content with the tool-result label removed, if this is a tool result.
    pub fn tool_output(&self) -> Option<&str> {
        if self.role == Role::User {
            self.content.strip_prefix(TOOL_RESULT_LABEL)
        } else {
            None
        }
    }
}

/// A tool call found in model output. `raw_arguments` is always valid JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    pub id: String,
    pub name: String,
    pub raw_arguments: String,
}

impl ToolInvocationRequest {
    pub fn arguments(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.raw_arguments)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub text: String,
    pub model: Option<String>,
}

impl ProviderResponse {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
