use anyhow::Result;
use clap::Parser;
use meal_agent::config::Config;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod app;
mod cli;

use cli::commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut config = Config::load_or_init()?;
    config.apply_env_overrides();
    if let Some(provider) = cli.provider.as_deref() {
        config.provider = provider.trim().to_lowercase();
    }
    if let Some(model) = cli.model.clone() {
        config.model = Some(model);
    }
    config.validate()?;

    app::dispatch::dispatch(cli, config).await
}
