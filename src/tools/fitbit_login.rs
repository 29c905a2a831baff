use super::args::unwrap_arguments;
use super::traits::{Tool, ToolResult};
use crate::error::AuthError;
use crate::fitbit::{FitbitAuthenticator, LoginOutcome};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Connect a Fitbit account through the browser-redirect OAuth flow.
pub struct FitbitLoginTool {
    authenticator: FitbitAuthenticator,
}

impl FitbitLoginTool {
    pub fn new(authenticator: FitbitAuthenticator) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl Tool for FitbitLoginTool {
    fn name(&self) -> &str {
        "fitbit_login"
    }

    fn description(&self) -> &str {
        "Authenticate with Fitbit. Opens a browser for authorization and waits for the redirect. Run this before logging meals or when a token has expired."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "force_reauth": {
                    "type": "boolean",
                    "description": "Re-authenticate even if a valid token is stored"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let args = unwrap_arguments(args)?;
        let force = args
            .get("force_reauth")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        match self.authenticator.login(force).await {
            Ok(LoginOutcome::AlreadyAuthenticated) => Ok(ToolResult::ok(
                "Already authenticated with Fitbit. Use force_reauth: true to connect a different account.",
            )),
            Ok(LoginOutcome::Authenticated { user_id }) => {
                let who = user_id.map_or_else(String::new, |id| format!(" as user {id}"));
                Ok(ToolResult::ok(format!(
                    "Successfully authenticated with Fitbit{who}. Meals can now be logged."
                )))
            }
            Err(e @ (AuthError::MissingClientCredentials { .. } | AuthError::Timeout)) => {
                Ok(ToolResult::fail(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
