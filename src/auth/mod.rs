//! Persisted Fitbit credential context.

pub mod store;

pub use store::{CURRENT_USER, CredentialStore, FitbitCredentials};
