//! Layered CLI settings.
//!
//! Sources, lowest precedence first:
//! - Built-in defaults
//! - `<config dir>/todo-cli/config.toml`, or the file given with `--config`
//! - `TODO_*` environment variables (`TODO_LABELS__NO_DATE` for nested keys)
//! - Command-line flags

use anyhow::{Context, Result, bail};
use chrono::format::{Item, StrftimeItems};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use todo_client::{ClientConfig, DEFAULT_BASE_URL};
use todo_core::GroupLabels;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,

    /// Request timeout; unset means no timeout
    pub timeout_seconds: Option<u64>,

    pub labels: GroupLabels,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: Some(30),
            labels: GroupLabels::default(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("todo-cli").join("config.toml"))
    }

    /// Load settings. An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration");
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    debug!(path = %default.display(), "Loading optional configuration");
                    builder = builder.add_source(File::from(default).required(false));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TODO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;
        let settings: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        settings.validate()
    }

    fn validate(self) -> Result<Self> {
        let format = &self.labels.date_format;
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            bail!("Invalid labels.date_format {format:?}");
        }
        Ok(self)
    }

    pub fn with_server_override(mut self, server: Option<String>) -> Self {
        if let Some(server) = server {
            self.server_url = server;
        }
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::builder()
            .base_url(self.server_url.clone())
            .maybe_timeout(self.timeout_seconds.map(Duration::from_secs))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server_url, "http://localhost:8000");
        assert_eq!(settings.labels.no_category, "No category");

        let client = settings.client_config();
        assert_eq!(client.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_file_overrides_defaults_and_flag_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
server_url = "http://todo.internal:9000"

[labels]
no_category = "Sem categoria"
no_date = "Sem data"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.labels.no_category, "Sem categoria");
        assert_eq!(settings.labels.date_format, "%d/%m/%Y");
        assert_eq!(settings.timeout_seconds, Some(30));

        let settings = settings.with_server_override(Some("http://other:1".to_string()));
        assert_eq!(settings.server_url, "http://other:1");
        assert_eq!(settings.client_config().base_url, "http://other:1");
    }

    #[test]
    fn test_invalid_date_format_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[labels]\ndate_format = \"%Q\"").unwrap();

        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("date_format"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/todo.toml"))).is_err());
    }
}
