//! Settings for talking to a repository server.
//!
//! Settings are read from a TOML file (by default `settings.toml` in the working directory) and
//!  can be overridden from the command line:
//!
//! ```toml
//! host = "https://nexus.example.com"
//! username = "deployer"
//! password = "secret"
//! default_repository = "public"
//! batch_policy = "continue"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::orchestrator::BatchPolicy;
use crate::util::validating_http_downloader::BasicCredentials;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no repository host configured: set `host` in the settings file or pass --host")]
    MissingHost,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_repository")]
    pub default_repository: String,
    #[serde(default)]
    pub batch_policy: BatchPolicy,
}

fn default_repository() -> String {
    "public".to_string()
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            host: None,
            username: None,
            password: None,
            default_repository: default_repository(),
            batch_policy: BatchPolicy::default(),
        }
    }
}

/// Values given on the command line, taking precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Settings {
    pub fn parse(text: &str, path: &Path) -> Result<Settings, ConfigError> {
        toml::from_str(text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// An explicitly requested file must exist; a missing default file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Settings::parse(&text, &path),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn with_overrides(self, overrides: SettingsOverrides) -> Settings {
        Settings {
            host: overrides.host.or(self.host),
            username: overrides.username.or(self.username),
            password: overrides.password.or(self.password),
            ..self
        }
    }

    pub fn host(&self) -> Result<&str, ConfigError> {
        match self.host.as_deref() {
            Some(h) if !h.trim().is_empty() => Ok(h),
            _ => Err(ConfigError::MissingHost),
        }
    }

    /// credentials are only sent if a username is configured
    pub fn credentials(&self) -> Option<BasicCredentials> {
        self.username.as_ref().map(|username| BasicCredentials {
            username: username.clone(),
            password: self.password.clone().unwrap_or_default(),
        })
    }
}
