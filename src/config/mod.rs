mod env_overrides;
mod loader;
pub mod schema;
pub mod system_prompt;

pub use schema::{AgentConfig, Config, FitbitConfig, GeminiConfig, OllamaConfig};
pub use system_prompt::{PromptSource, SystemPrompt, create_default_prompt_file};
