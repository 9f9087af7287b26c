//! Configuration file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use mailwright_core::{MailerConfig, SmtpSettings};
use serde::{Deserialize, Serialize};

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sender address, optionally in `Name <addr>` form.
    pub mail_from: String,
    /// Sender display name.
    pub mail_from_name: String,
    /// Relay settings; leave incomplete to use the local sendmail.
    pub smtp: SmtpSettings,
}

impl AppConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailwright")
            .join("config.json")
    }

    /// Reads and validates the configuration file.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read configuration file {}", path.display()))?;
        let config = Self::from_json(&contents)
            .with_context(|| format!("Cannot parse configuration file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    fn from_json(contents: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        if config.mail_from.trim().is_empty() {
            bail!("\"mail_from\" is not set");
        }
        Ok(config)
    }

    /// Splits off the part the facade needs.
    pub fn mailer_config(&self) -> MailerConfig {
        MailerConfig {
            smtp: self.smtp.clone(),
        }
    }
}
