use super::client::FitbitClient;
use crate::auth::{CredentialStore, FitbitCredentials};
use crate::config::FitbitConfig;
use crate::error::AuthError;
use crate::ui::style;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use chrono::Utc;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use url::Url;

pub const OAUTH_SCOPE: &str = "nutrition profile";
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Meal Agent - Fitbit Authorization</title></head>
<body style="font-family: sans-serif; text-align: center; margin-top: 80px;">
<h1 style="color: #00B0B9;">Authorization successful</h1>
<p>Meal Agent can now log meals to your Fitbit account.</p>
<p>You can close this window and return to the terminal.</p>
</body>
</html>"#;

const FAILURE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Meal Agent - Fitbit Authorization</title></head>
<body style="font-family: sans-serif; text-align: center; margin-top: 80px;">
<h1 style="color: #C0392B;">Authorization failed</h1>
<p>Return to the terminal for details.</p>
</body>
</html>"#;

/// Build the browser URL that starts the authorization-code flow.
pub fn authorize_url(
    auth_base: &str,
    client_id: &str,
    redirect_url: &str,
) -> Result<Url, AuthError> {
    let mut url = Url::parse(&format!("{}/oauth2/authorize", auth_base.trim_end_matches('/')))
        .map_err(|e| AuthError::OAuth(format!("invalid authorization base URL: {e}")))?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_url)
        .append_pair("scope", OAUTH_SCOPE);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Clone)]
struct CallbackState {
    tx: mpsc::Sender<Result<String, AuthError>>,
}

/// Local HTTP listener that receives the OAuth redirect.
///
/// Bound up front so the port is reserved before the browser is opened.
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

impl CallbackListener {
    pub async fn bind(redirect_url: &str) -> Result<Self, AuthError> {
        let invalid = |reason: String| AuthError::InvalidRedirectUrl {
            url: redirect_url.to_string(),
            reason,
        };
        let url = Url::parse(redirect_url).map_err(|e| invalid(e.to_string()))?;
        let host = url.host_str().unwrap_or("localhost").to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port".to_string()))?;
        let path = match url.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .map_err(|e| invalid(format!("cannot listen on {host}:{port}: {e}")))?;
        tracing::debug!(%host, port, %path, "OAuth callback listener bound");
        Ok(Self { listener, path })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AuthError> {
        self.listener
            .local_addr()
            .map_err(|e| AuthError::OAuth(format!("callback listener has no address: {e}")))
    }

    /// Serve until the first callback arrives or `timeout` elapses.
    pub async fn wait_for_code(self, timeout: Duration) -> Result<String, AuthError> {
        let (tx, mut rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route(&self.path, get(handle_callback))
            .with_state(CallbackState { tx });
        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = tokio::time::timeout(timeout, rx.recv()).await;
        let _ = shutdown_tx.send(());
        if let Err(e) = server.await {
            tracing::warn!("OAuth callback server task failed: {e}");
        }

        match outcome {
            Ok(Some(result)) => result,
            Ok(None) => Err(AuthError::OAuth("callback listener closed".to_string())),
            Err(_) => Err(AuthError::Timeout),
        }
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    let (result, response) = match (params.code, params.error) {
        (_, Some(error)) => {
            let detail = params
                .error_description
                .map_or(error.clone(), |d| format!("{error}: {d}"));
            (
                Err(AuthError::OAuth(detail)),
                (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE)),
            )
        }
        (Some(code), None) if !code.is_empty() => (Ok(code), (StatusCode::OK, Html(SUCCESS_PAGE))),
        _ => (
            Err(AuthError::OAuth("no authorization code received".to_string())),
            (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE)),
        ),
    };
    // Only the first callback matters; later ones find the channel full or closed.
    let _ = state.tx.try_send(result);
    response
}

/// Try to open `url` in the user's browser.
pub fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    let mut command = std::process::Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = std::process::Command::new("xdg-open");

    match command.arg(url).spawn() {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Could not open browser: {e}");
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    AlreadyAuthenticated,
    Authenticated { user_id: Option<String> },
}

/// Runs the browser-redirect login and persists the resulting tokens.
pub struct FitbitAuthenticator {
    config: FitbitConfig,
    client: FitbitClient,
    store: Arc<CredentialStore>,
    timeout: Duration,
    launch_browser: bool,
}

impl FitbitAuthenticator {
    pub fn new(config: FitbitConfig, store: Arc<CredentialStore>) -> Self {
        let client = FitbitClient::new(&config.api_base);
        Self {
            config,
            client,
            store,
            timeout: LOGIN_TIMEOUT,
            launch_browser: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn without_browser(mut self) -> Self {
        self.launch_browser = false;
        self
    }

    pub async fn login(&self, force_reauth: bool) -> Result<LoginOutcome, AuthError> {
        let existing = self.store.current().filter(|_| !force_reauth);
        if let Some(existing) = existing {
            match self.client.validate_token(&existing.access_token).await {
                Ok(()) => return Ok(LoginOutcome::AlreadyAuthenticated),
                Err(e) => tracing::info!("Stored Fitbit token rejected, re-authenticating: {e}"),
            }
        }

        let (client_id, client_secret) = self.client_credentials()?;
        let redirect_url = self.config.redirect_url.as_str();
        let listener = CallbackListener::bind(redirect_url).await?;
        let url = authorize_url(&self.config.auth_base, client_id, redirect_url)?;

        println!();
        println!("{}", style::title("Open this URL to authorize Fitbit access:"));
        println!("  {}", style::link(&url));
        if self.launch_browser && open_browser(url.as_str()) {
            println!("{}", style::muted("A browser window should open automatically."));
        }
        println!("{}", style::muted("Waiting for authorization..."));

        let code = listener.wait_for_code(self.timeout).await?;
        let tokens = self
            .client
            .exchange_code(client_id, client_secret, redirect_url, &code)
            .await?;

        let credentials = FitbitCredentials {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user_id: tokens.user_id,
            expires_at: tokens
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        };
        let user_id = credentials.user_id.clone();
        self.store.save(credentials)?;
        tracing::info!(user = ?user_id, "Fitbit login complete");
        Ok(LoginOutcome::Authenticated { user_id })
    }

    fn client_credentials(&self) -> Result<(&str, &str), AuthError> {
        let id = self.config.client_id.as_deref().filter(|s| !s.is_empty());
        let secret = self.config.client_secret.as_deref().filter(|s| !s.is_empty());
        match (id, secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(AuthError::MissingClientCredentials {
                redirect_url: self.config.redirect_url.clone(),
            }),
        }
    }
}
