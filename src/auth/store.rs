use crate::error::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Fallback user id understood by the Fitbit API as "the token's owner".
pub const CURRENT_USER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitbitCredentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl FitbitCredentials {
    pub fn user_id_or_current(&self) -> &str {
        self.user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(CURRENT_USER)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }
}

/// Fitbit credentials persisted as a JSON file and shared by the Fitbit tools.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    current: RwLock<Option<FitbitCredentials>>,
}

impl CredentialStore {
    /// Open the store, reading any credentials already saved at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let path = path.into();
        let current: Option<FitbitCredentials> = match fs::read_to_string(&path) {
            Ok(contents) => Some(serde_json::from_str(&contents).map_err(|e| store_error(&path, &e))?),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(store_error(&path, &e)),
        };
        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<FitbitCredentials> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current()
            .is_some_and(|creds| !creds.access_token.is_empty() && !creds.is_expired(Utc::now()))
    }

    /// Persist new credentials, replacing any previous ones.
    pub fn save(&self, credentials: FitbitCredentials) -> Result<(), AuthError> {
        let json =
            serde_json::to_string_pretty(&credentials).map_err(|e| store_error(&self.path, &e))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| store_error(&self.path, &e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| store_error(&tmp, &e))?;
        restrict_permissions(&tmp);
        fs::rename(&tmp, &self.path).map_err(|e| store_error(&self.path, &e))?;

        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
        Ok(())
    }

    /// Forget stored credentials. Returns whether any were present.
    pub fn clear(&self) -> Result<bool, AuthError> {
        let had = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(had),
            Err(e) => Err(store_error(&self.path, &e)),
        }
    }
}

fn store_error(path: &Path, error: &dyn std::fmt::Display) -> AuthError {
    AuthError::Store {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!(path = %path.display(), "Failed to restrict credential file permissions: {e}");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
