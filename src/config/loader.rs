use super::schema::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

const PROVIDERS: [&str; 3] = ["ollama", "deepseek", "gemini"];

impl Config {
    /// Load `~/.meal-agent/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_in(&home.join(".meal-agent"))
    }

    pub fn load_or_init_in(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");

        if !data_dir.exists() {
            fs::create_dir_all(data_dir).context("Failed to create .meal-agent directory")?;
        }

        let mut config = if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            Config::default()
        };
        config.config_path.clone_from(&config_path);
        config.data_dir = data_dir.to_path_buf();

        if !config_path.exists() {
            config.save()?;
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !PROVIDERS.contains(&self.provider.as_str()) {
            return Err(ConfigError::UnknownProvider(self.provider.clone()));
        }
        if self.agent.max_tool_rounds == 0 {
            return Err(ConfigError::Validation(
                "agent.max_tool_rounds must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.fitbit.redirect_url).map_err(|e| {
            ConfigError::Validation(format!(
                "fitbit.redirect_url {:?} is not a valid URL: {e}",
                self.fitbit.redirect_url
            ))
        })?;
        Ok(())
    }
}
