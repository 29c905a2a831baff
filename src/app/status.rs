use meal_agent::auth::CredentialStore;
use meal_agent::config::Config;
use meal_agent::llm::Provider;
use meal_agent::tools::ToolRegistry;
use meal_agent::ui::style as ui;

/// Render the `status` report. `provider_check` is the outcome of the
/// provider health check.
pub fn render_status(
    config: &Config,
    provider: &dyn Provider,
    provider_check: Result<(), String>,
    registry: &ToolRegistry,
    credentials: &CredentialStore,
) -> String {
    let mut lines = vec![
        format!("{} {}", ui::bullet("*"), ui::title("Meal Agent status")),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Config      {}", config.config_path.display()),
        format!("Data        {}", config.data_dir.display()),
        String::new(),
        format!("Provider    {}", ui::highlight(provider.name())),
        format!("Model       {}", config.resolved_model()),
    ];
    lines.push(match provider_check {
        Ok(()) => format!("Ready       {}", ui::ok("yes")),
        Err(reason) => format!("Ready       {} {}", ui::failure("no"), ui::muted(reason)),
    });

    lines.push(String::new());
    lines.push(format!("Tools       {}", registry.len()));
    for spec in registry.specs() {
        lines.push(format!("  {} {}", ui::bullet("-"), spec.name));
    }

    lines.push(String::new());
    let fitbit = match credentials.current() {
        Some(_) if credentials.is_authenticated() => ui::ok("connected"),
        Some(_) => ui::warning("token expired (run fitbit_login)"),
        None => ui::muted("not connected"),
    };
    lines.push(format!("Fitbit      {fitbit}"));
    let app_configured = config.fitbit.client_id.is_some() && config.fitbit.client_secret.is_some();
    lines.push(format!(
        "OAuth app   {}",
        if app_configured {
            ui::ok("configured")
        } else {
            ui::warning("FITBIT_CLIENT_ID / FITBIT_CLIENT_SECRET not set")
        }
    ));
    lines.push(format!("Redirect    {}", ui::link(&config.fitbit.redirect_url)));

    lines.join("\n")
}
