use super::gemini::GeminiProvider;
use super::ollama::OllamaProvider;
use super::traits::Provider;
use crate::config::Config;
use crate::error::ConfigError;

/// Resolve the Gemini API key from config, then `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
pub fn resolve_api_key(explicit_api_key: Option<&str>) -> Option<String> {
    resolve_api_key_with(explicit_api_key, |var| std::env::var(var).ok())
}

fn resolve_api_key_with(
    explicit_api_key: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if let Some(key) = explicit_api_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }
    ["GEMINI_API_KEY", "GOOGLE_API_KEY"]
        .into_iter()
        .filter_map(lookup)
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Build the provider named by `config.provider`.
///
/// `deepseek` is accepted as an alias for the local Ollama backend, which
/// serves DeepSeek models by default.
pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>, ConfigError> {
    let model = config.resolved_model();
    match config.provider.as_str() {
        "ollama" | "deepseek" => Ok(Box::new(OllamaProvider::new(
            Some(&config.ollama.host),
            Some(&model),
        ))),
        "gemini" => {
            let api_key = resolve_api_key(config.gemini.api_key.as_deref());
            Ok(Box::new(GeminiProvider::new(api_key.as_deref(), Some(&model))))
        }
        other => Err(ConfigError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins() {
        let key = resolve_api_key_with(Some("  abc "), |_| Some("env".into()));
        assert_eq!(key.as_deref(), Some("abc"));
    }

    #[test]
    fn env_fallback_order() {
        let key = resolve_api_key_with(None, |var| match var {
            "GEMINI_API_KEY" => Some("   ".into()),
            "GOOGLE_API_KEY" => Some("google".into()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("google"));
        assert!(resolve_api_key_with(Some(""), |_| None).is_none());
    }

    #[test]
    fn builds_known_providers() {
        let mut config = Config::default();
        assert_eq!(create_provider(&config).unwrap().name(), "ollama");

        config.provider = "deepseek".into();
        assert_eq!(create_provider(&config).unwrap().name(), "ollama");

        config.provider = "gemini".into();
        assert_eq!(create_provider(&config).unwrap().name(), "gemini");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = Config {
            provider: "clippy".into(),
            ..Config::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownProvider(name) if name == "clippy"));
    }
}
