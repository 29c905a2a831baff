use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `meal-agent`.
///
/// Each subsystem defines its own error type. The conversation loop matches on
/// these to decide whether a failure keeps the session alive; application glue
/// continues to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum AgentError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── LLM / Provider ──────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Meal input validation ───────────────────────────────────────────
    #[error("input: {0}")]
    Input(#[from] InputError),

    // ── Credentials / OAuth ─────────────────────────────────────────────
    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    // ── Fitbit HTTP API ─────────────────────────────────────────────────
    #[error("fitbit: {0}")]
    Remote(#[from] RemoteError),

    // ── Local meal history ──────────────────────────────────────────────
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    // ── Tools ───────────────────────────────────────────────────────────
    #[error("tool: {0}")]
    Tool(#[from] ToolError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unsupported provider '{0}' (expected one of: ollama, deepseek, gemini)")]
    UnknownProvider(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

/// Classification of a failed generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LlmErrorKind {
    QuotaExceeded,
    RateLimited,
    InvalidCredential,
    ServiceUnavailable,
    InvalidRequest,
    Unknown,
}

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("{provider} API quota exceeded: {message}")]
    QuotaExceeded { provider: String, message: String },

    #[error("{provider} API rate limited: {message}")]
    RateLimited { provider: String, message: String },

    #[error("{provider} rejected the API key: {message}")]
    InvalidCredential { provider: String, message: String },

    #[error("{provider} service unavailable: {message}")]
    ServiceUnavailable { provider: String, message: String },

    #[error("{provider} invalid request: {message}")]
    InvalidRequest { provider: String, message: String },

    #[error("{provider} error: {message}")]
    Unknown { provider: String, message: String },
}

/// Lower-cased substrings that mark an unclassified provider failure as transient.
const RECOVERABLE_KEYWORDS: [&str; 14] = [
    "quota",
    "rate limit",
    "429",
    "api key",
    "401",
    "403",
    "service unavailable",
    "502",
    "503",
    "504",
    "timeout",
    "network",
    "connection",
    "temporary",
];

impl LlmError {
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            Self::QuotaExceeded { .. } => LlmErrorKind::QuotaExceeded,
            Self::RateLimited { .. } => LlmErrorKind::RateLimited,
            Self::InvalidCredential { .. } => LlmErrorKind::InvalidCredential,
            Self::ServiceUnavailable { .. } => LlmErrorKind::ServiceUnavailable,
            Self::InvalidRequest { .. } => LlmErrorKind::InvalidRequest,
            Self::Unknown { .. } => LlmErrorKind::Unknown,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::QuotaExceeded { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::InvalidCredential { provider, .. }
            | Self::ServiceUnavailable { provider, .. }
            | Self::InvalidRequest { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::QuotaExceeded { message, .. }
            | Self::RateLimited { message, .. }
            | Self::InvalidCredential { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::InvalidRequest { message, .. }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// Whether the session should report this failure and keep going.
    pub fn is_recoverable(&self) -> bool {
        match self.kind() {
            LlmErrorKind::QuotaExceeded
            | LlmErrorKind::RateLimited
            | LlmErrorKind::InvalidCredential
            | LlmErrorKind::ServiceUnavailable => true,
            LlmErrorKind::InvalidRequest | LlmErrorKind::Unknown => {
                is_recoverable_message(self.message())
            }
        }
    }

    /// User-facing guidance for a recoverable failure.
    pub fn remediation(&self) -> String {
        let kind = match self.kind() {
            LlmErrorKind::InvalidRequest | LlmErrorKind::Unknown => {
                keyword_kind(self.message()).unwrap_or(LlmErrorKind::Unknown)
            }
            kind => kind,
        };
        match kind {
            LlmErrorKind::QuotaExceeded => "You've exceeded your API quota. Check your billing plan, \
                 wait for the quota to reset, or switch to a local provider (--provider ollama)."
                .to_string(),
            LlmErrorKind::RateLimited => {
                "API rate limited. Please wait a moment and try again.".to_string()
            }
            LlmErrorKind::InvalidCredential => format!(
                "Invalid API key. Please check your {}_API_KEY environment variable.",
                self.provider().to_ascii_uppercase()
            ),
            LlmErrorKind::ServiceUnavailable => {
                "Service temporarily unavailable. Please try again later.".to_string()
            }
            LlmErrorKind::InvalidRequest | LlmErrorKind::Unknown => {
                "Try again or switch to a different LLM provider.".to_string()
            }
        }
    }
}

/// Recoverable kind implied by the wording of an otherwise unclassified message.
fn keyword_kind(message: &str) -> Option<LlmErrorKind> {
    let lower = message.to_ascii_lowercase();
    if lower.contains("quota") {
        Some(LlmErrorKind::QuotaExceeded)
    } else if lower.contains("rate limit") {
        Some(LlmErrorKind::RateLimited)
    } else if lower.contains("api key") {
        Some(LlmErrorKind::InvalidCredential)
    } else if lower.contains("service unavailable") {
        Some(LlmErrorKind::ServiceUnavailable)
    } else {
        None
    }
}

/// Keyword match for failures whose kind alone does not decide recoverability.
pub fn is_recoverable_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    RECOVERABLE_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

// ─── Meal input validation errors ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} is required")]
    MissingNumber { field: String },

    #[error("{field} cannot be empty")]
    EmptyNumber { field: String },

    #[error("{field} must be a number, got: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("{field} must be a number, got type: {kind}")]
    UnsupportedNumberType { field: String, kind: &'static str },

    #[error("meal input must be a JSON object, got: {0}")]
    NotAnObject(&'static str),

    #[error(
        "invalid or missing meal type. Must be one of: breakfast, lunch, dinner, snack. Got: {got:?}"
    )]
    InvalidMealCategory { got: String },

    #[error("no food items found. Please provide at least one food item")]
    NoFoodItems,

    #[error("error parsing food item {position}: entry must be an object")]
    MalformedItem { position: usize },

    #[error("error parsing food item {position}: food item must have a name")]
    MissingName { position: usize },

    #[error("error parsing food item {position} ({name}): calories must be specified")]
    MissingCalories { position: usize, name: String },

    #[error("calorie mismatch: calculated {computed:.0} calories but expected {expected:.0} calories")]
    CalorieMismatch { computed: f64, expected: f64 },

    #[error("invalid date {value:?}, expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error(
        "received truncated or invalid JSON input. Please ensure the complete meal data is provided. Got: {preview}"
    )]
    TruncatedArguments { preview: String },

    #[error("failed to parse arguments: {0}")]
    MalformedArguments(String),
}

// ─── Credential / OAuth errors ──────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated with Fitbit")]
    NotAuthenticated,

    #[error(
        "Fitbit credentials not configured. Set FITBIT_CLIENT_ID and FITBIT_CLIENT_SECRET \
         (create an application at https://dev.fitbit.com/ with redirect URL {redirect_url})"
    )]
    MissingClientCredentials { redirect_url: String },

    #[error("invalid redirect URL {url}: {reason}")]
    InvalidRedirectUrl { url: String, reason: String },

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("authentication timeout - please try again")]
    Timeout,

    #[error("token request failed with status {status}")]
    TokenExchange { status: u16 },

    #[error("credential store {path}: {message}")]
    Store { path: String, message: String },
}

// ─── Fitbit HTTP errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The access token was rejected (HTTP 401); callers prompt re-authentication.
    #[error("unauthorized: access token may be expired (401)")]
    Unauthorized,

    #[error("{context}: HTTP {status}")]
    Status { context: String, status: u16 },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context}: unexpected response body: {message}")]
    Decode { context: String, message: String },
}

impl RemoteError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

// ─── Storage errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize meal records: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ─── Tool errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{name}' not found")]
    NotFound { name: String },

    #[error("tool '{name}' execution failed: {message}")]
    Execution { name: String, message: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AgentError>;
