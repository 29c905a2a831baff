use super::schema::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(provider) = get(&["MEAL_AGENT_PROVIDER", "LLM_PROVIDER"]) {
            self.provider = provider.trim().to_lowercase();
        }
        if let Some(model) = get(&["MEAL_AGENT_MODEL", "LLM_MODEL"]) {
            self.model = Some(model);
        }
        if let Some(host) = get(&["OLLAMA_HOST"]) {
            self.ollama.host = host;
        }
        if let Some(key) = get(&["GEMINI_API_KEY"]) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = get(&["GEMINI_MODEL"]) {
            self.gemini.model = Some(model);
        }
        if let Some(id) = get(&["FITBIT_CLIENT_ID"]) {
            self.fitbit.client_id = Some(id);
        }
        if let Some(secret) = get(&["FITBIT_CLIENT_SECRET"]) {
            self.fitbit.client_secret = Some(secret);
        }
        if let Some(url) = get(&["FITBIT_REDIRECT_URL"]) {
            self.fitbit.redirect_url = url;
        }
    }
}
