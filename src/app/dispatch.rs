use crate::app::status::render_status;
use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use meal_agent::agent::{CliSessionSink, ConsoleInput, Session};
use meal_agent::auth::CredentialStore;
use meal_agent::config::{Config, SystemPrompt, create_default_prompt_file};
use meal_agent::llm::create_provider;
use meal_agent::tools::default_registry;
use meal_agent::ui::style as ui;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_PROMPT_PATH: &str = "system_prompt.txt";

/// Start the interactive conversation.
///
/// 1. Resolves the system prompt.
/// 2. Builds the provider and checks it is reachable.
/// 3. Registers the Fitbit and local-storage tools.
/// 4. Runs the session until input ends.
async fn run_chat(config: &Config, prompt_file: Option<PathBuf>) -> Result<()> {
    let prompt_file = prompt_file.or_else(|| config.system_prompt_file.clone());
    let system_prompt = SystemPrompt::resolve(prompt_file.as_deref(), &config.data_dir);

    let provider = create_provider(config)?;
    if let Err(e) = provider.health_check().await {
        if !e.is_recoverable() {
            bail!("{e}");
        }
        println!("{} {e}", ui::warning("Warning:"));
        println!("{} {}", ui::muted("Suggestion:"), e.remediation());
    }

    let credentials = Arc::new(CredentialStore::open(config.credentials_path())?);
    let registry = Arc::new(default_registry(config, &credentials));
    info!(
        provider = provider.name(),
        model = %config.resolved_model(),
        prompt = %system_prompt.describe_source(),
        tools = registry.len(),
        "Starting chat session"
    );

    println!(
        "{} {}",
        ui::bullet("*"),
        ui::title(format!(
            "Meal Agent - chatting with {} ({}). Ctrl-C to quit.",
            provider.name(),
            config.resolved_model()
        ))
    );
    println!(
        "  {}",
        ui::muted("Try saying: 'I had scrambled eggs and toast for breakfast'")
    );
    if !system_prompt.is_default() {
        println!(
            "  {}",
            ui::muted(format!("Using system prompt from {}", system_prompt.describe_source()))
        );
    }
    println!();

    let mut session = Session::new(provider, registry, &system_prompt.content)
        .with_max_tool_rounds(config.agent.max_tool_rounds);
    let mut input = ConsoleInput::new(format!("{}: ", ui::you("You")));
    let sink = CliSessionSink::new("Meal Agent");
    session.run(&mut input, &sink).await?;
    Ok(())
}

async fn show_status(config: &Config) -> Result<()> {
    let provider = create_provider(config)?;
    let check = provider.health_check().await.map_err(|e| e.to_string());
    let credentials = Arc::new(CredentialStore::open(config.credentials_path())?);
    let registry = default_registry(config, &credentials);
    println!(
        "{}",
        render_status(config, provider.as_ref(), check, &registry, &credentials)
    );
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(&config, cli.system_prompt).await,

        Commands::Status => show_status(&config).await,

        Commands::Version => {
            println!("meal-agent {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        Commands::CreateSystemPrompt { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_PATH));
            create_default_prompt_file(&path)?;
            println!(
                "{} Created {}",
                ui::ok("ok"),
                ui::highlight(path.display())
            );
            println!(
                "  {}",
                ui::muted("Edit it, then run with --system-prompt or place it in ~/.meal-agent/")
            );
            Ok(())
        }

        Commands::Logout => {
            let store = CredentialStore::open(config.credentials_path())
                .context("Failed to open Fitbit credential store")?;
            if store.clear()? {
                println!("{} Fitbit credentials removed", ui::ok("ok"));
            } else {
                println!("{}", ui::muted("No Fitbit credentials were stored"));
            }
            Ok(())
        }
    }
}
