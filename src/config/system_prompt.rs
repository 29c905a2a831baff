use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const PROMPT_FILE_NAME: &str = "system_prompt.txt";

const DEFAULT_SYSTEM_PROMPT: &str = "You are Meal Agent, a personal nutrition assistant with access to Fitbit and local meal-logging tools.

## Your Role
- Help users log meals and track nutrition using natural language
- Make logging as simple as saying \"I had a turkey sandwich for lunch\"
- Give reasonable calorie estimates for every food item

## Guidelines
1. Log meals as soon as the user describes them
2. Always include a calorie estimate for each item
3. Ask for clarification only when a description is genuinely unclear
4. If Fitbit is unavailable, offer to save the meal locally instead

## Response Style
- Friendly and encouraging, never preachy
- Show a short calorie breakdown after logging";

/// Where the active system prompt came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    Environment,
    File(PathBuf),
    Default,
}

#[derive(Debug, Clone)]
pub struct SystemPrompt {
    pub content: String,
    pub source: PromptSource,
}

impl SystemPrompt {
    /// Resolve the prompt: `SYSTEM_PROMPT`, then an explicit file
    /// (`SYSTEM_PROMPT_FILE` or `--system-prompt`), then `./system_prompt.txt`,
    /// then `<data_dir>/system_prompt.txt`, then the built-in default.
    pub fn resolve(explicit_file: Option<&Path>, data_dir: &Path) -> Self {
        Self::resolve_with(
            std::env::var("SYSTEM_PROMPT").ok(),
            std::env::var("SYSTEM_PROMPT_FILE").ok().map(PathBuf::from),
            explicit_file,
            data_dir,
        )
    }

    fn resolve_with(
        env_prompt: Option<String>,
        env_file: Option<PathBuf>,
        explicit_file: Option<&Path>,
        data_dir: &Path,
    ) -> Self {
        if let Some(content) = env_prompt.filter(|p| !p.trim().is_empty()) {
            return Self {
                content,
                source: PromptSource::Environment,
            };
        }

        let candidates = env_file
            .into_iter()
            .chain(explicit_file.map(Path::to_path_buf))
            .chain([PathBuf::from(PROMPT_FILE_NAME), data_dir.join(PROMPT_FILE_NAME)]);

        for path in candidates {
            match fs::read_to_string(&path) {
                Ok(content) if !content.trim().is_empty() => {
                    return Self {
                        content: content.trim().to_string(),
                        source: PromptSource::File(path),
                    };
                }
                Ok(_) => tracing::debug!(path = %path.display(), "Skipping empty system prompt file"),
                Err(_) => {}
            }
        }

        Self::default()
    }

    pub fn is_default(&self) -> bool {
        self.source == PromptSource::Default
    }

    pub fn describe_source(&self) -> String {
        match &self.source {
            PromptSource::Environment => "environment".to_string(),
            PromptSource::File(path) => path.display().to_string(),
            PromptSource::Default => "default".to_string(),
        }
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self {
            content: DEFAULT_SYSTEM_PROMPT.to_string(),
            source: PromptSource::Default,
        }
    }
}

/// Write the built-in prompt to `path` so it can be customised.
pub fn create_default_prompt_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_SYSTEM_PROMPT)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
