// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod classify;
pub mod http_client;
pub mod scrub;
pub mod tool_protocol;
pub mod traits;
pub mod types;

// ── Provider implementations ────────────────────────────────────────────────
pub mod factory;
pub mod gemini;
pub mod ollama;

// ── Infrastructure re-exports ───────────────────────────────────────────────
pub use http_client::{build_provider_client, build_provider_client_with_timeout};
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use tool_protocol::{
    TextToolProtocol, ToolCallExtractor, augment_system_prompt_with_tools, contains_directive,
    extract_tool_calls,
};
pub use traits::Provider;
pub use types::{ConversationTurn, ProviderResponse, Role, ToolInvocationRequest};

// ── Provider + factory re-exports ───────────────────────────────────────────
pub use factory::create_provider;
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
