//! Client configuration.
//!
//! Loaded from a TOML file, then overridden by the `DEEDKIT_URL`
//! environment variable and finally by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use deedkit_gateway::BasicAuth;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Default ledger REST endpoint.
pub const DEFAULT_URL: &str = "http://localhost:8008";

/// Environment variable that overrides the configured URL.
pub const URL_ENV: &str = "DEEDKIT_URL";

/// Settings for a [`DeedClient`](crate::DeedClient).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Ledger REST base URL.
    pub url: String,

    /// Private key file. Without one the client is read-only.
    pub key_file: Option<PathBuf>,

    /// Basic-auth user name.
    pub username: Option<String>,

    /// Basic-auth password.
    pub password: Option<String>,

    /// Seconds to wait for commitment after each write. `0` or unset
    /// returns as soon as the ledger accepts the batch.
    pub wait_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            key_file: None,
            username: None,
            password: None,
            wait_secs: None,
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(config_error)
    }

    /// Load a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Apply `DEEDKIT_URL` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_url_override(std::env::var(URL_ENV).ok())
    }

    /// Replace the URL when `url` is present and non-empty.
    pub fn with_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.url = url;
        }
        self
    }

    /// Credentials, when a user name is configured.
    ///
    /// A password without a user name is a configuration error.
    pub fn auth(&self) -> Result<Option<BasicAuth>> {
        match (&self.username, &self.password) {
            (Some(user), password) => Ok(Some(BasicAuth::new(
                user.clone(),
                password.clone().unwrap_or_default(),
            ))),
            (None, Some(_)) => Err(ClientError::Config(
                "password is set but username is not".into(),
            )),
            (None, None) => Ok(None),
        }
    }

    /// The commit wait as a duration; `None` means do not wait.
    pub fn wait(&self) -> Option<Duration> {
        self.wait_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn config_error(err: impl std::fmt::Display) -> ClientError {
    ClientError::Config(err.to_string())
}
