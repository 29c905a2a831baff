use super::scrub::sanitize_api_error;
use crate::error::LlmError;

/// Classify a failed HTTP exchange from its status code and error message.
pub fn classify_status(provider: &str, status: u16, message: &str) -> LlmError {
    let provider = provider.to_string();
    let message = sanitize_api_error(message);
    match status {
        429 if message.to_ascii_lowercase().contains("quota") => {
            LlmError::QuotaExceeded { provider, message }
        }
        429 => LlmError::RateLimited { provider, message },
        400 if message.to_ascii_lowercase().contains("api key") => {
            LlmError::InvalidCredential { provider, message }
        }
        400 => LlmError::InvalidRequest { provider, message },
        401 | 403 => LlmError::InvalidCredential { provider, message },
        500 | 502 | 503 | 504 => LlmError::ServiceUnavailable { provider, message },
        _ => LlmError::Unknown {
            provider,
            message: format!("HTTP {status}: {message}"),
        },
    }
}

/// Classify a request that never produced a usable response.
pub fn classify_transport(provider: &str, error: &reqwest::Error) -> LlmError {
    let message = sanitize_api_error(&error.to_string());
    if error.is_timeout() || error.is_connect() {
        LlmError::ServiceUnavailable {
            provider: provider.to_string(),
            message,
        }
    } else {
        LlmError::Unknown {
            provider: provider.to_string(),
            message,
        }
    }
}
