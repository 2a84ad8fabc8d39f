//! Runtime configuration: where the service lives and which account to use.
//!
//! Values come from the environment (see the `ENV_*` constants) or from the
//! command line, whose flags fall back to the same variables.

use crate::adapters::http::ClientConfig;
use crate::domain::pet::Credentials;
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru";

pub const ENV_BASE_URL: &str = "PETFRIENDS_BASE_URL";
pub const ENV_EMAIL: &str = "PETFRIENDS_EMAIL";
pub const ENV_PASSWORD: &str = "PETFRIENDS_PASSWORD";
pub const ENV_PHOTO: &str = "PETFRIENDS_PHOTO";
pub const ENV_TIMEOUT_SECS: &str = "PETFRIENDS_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    /// `None` when no account is configured; scenarios then cannot run.
    pub credentials: Option<Credentials>,
    /// Image uploaded by the scenarios that need one.
    pub photo: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: None,
            photo: None,
            timeout: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credentials = match (non_empty(ENV_EMAIL), lookup(ENV_PASSWORD)) {
            (Some(email), Some(password)) => Some(Credentials::new(email, password)),
            _ => None,
        };

        let timeout = non_empty(ENV_TIMEOUT_SECS)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}"))
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            base_url: non_empty(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            credentials,
            photo: non_empty(ENV_PHOTO).map(PathBuf::from),
            timeout,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        }
    }

    /// Credentials, or an error naming the variables to set.
    pub fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().with_context(|| {
            format!("no account configured: set {ENV_EMAIL} and {ENV_PASSWORD} (or pass --email/--password)")
        })
    }
}
