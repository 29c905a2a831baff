use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `meal-agent` - log meals to Fitbit by describing them in plain language.
#[derive(Parser, Debug)]
#[command(name = "meal-agent")]
#[command(version)]
#[command(about = "Conversational meal logging for Fitbit.", long_about = None)]
pub struct Cli {
    /// LLM provider (ollama, deepseek, gemini)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model to use with the selected provider
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read the system prompt from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub system_prompt: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive meal-logging conversation (default)
    Chat,

    /// Show provider readiness, registered tools and Fitbit connection state
    Status,

    /// Print version information
    Version,

    /// Write the built-in system prompt to a file for customisation
    CreateSystemPrompt {
        /// Destination (default: ./system_prompt.txt)
        path: Option<PathBuf>,
    },

    /// Forget stored Fitbit credentials
    Logout,
}
