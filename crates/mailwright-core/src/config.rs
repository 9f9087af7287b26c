//! Mailer configuration.

use crate::error::SendError;
use mailwright_smtp::{DEFAULT_PORT, DEFAULT_TIMEOUT, EncryptionMode, SmtpEndpointConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Everything the facade needs besides the message itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    /// Relay settings; incomplete settings select local submission.
    pub smtp: SmtpSettings,
}

/// Raw relay settings as found in a configuration file.
///
/// Any field may be missing. Only [`SmtpSettings::endpoint`] decides whether
/// they are complete enough to use.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// Relay host.
    pub host: Option<String>,
    /// Relay port.
    pub port: u16,
    /// Login name.
    pub username: Option<String>,
    /// Login secret.
    pub password: Option<String>,
    /// `"tls"`/`"starttls"`, `"ssl"` or `"none"`; anything else means STARTTLS.
    pub encryption: EncryptionMode,
    /// Name announced in EHLO/HELO.
    pub client_name: Option<String>,
    /// Per-operation timeout in seconds.
    pub timeout: u64,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            username: None,
            password: None,
            encryption: EncryptionMode::default(),
            client_name: None,
            timeout: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl SmtpSettings {
    /// Builds the endpoint if host, username and password are all present.
    ///
    /// Returns `Ok(None)` when any of them is empty, which routes the send to
    /// local submission.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Config`] if the settings are complete but the
    /// port is zero.
    pub fn endpoint(&self) -> Result<Option<SmtpEndpointConfig>, SendError> {
        let host = non_empty(self.host.as_deref());
        let username = non_empty(self.username.as_deref());
        let password = self.password.as_deref().filter(|p| !p.is_empty());

        let (Some(host), Some(username), Some(password)) = (host, username, password) else {
            return Ok(None);
        };

        if self.port == 0 {
            return Err(SendError::Config(
                "Missing SMTP settings (host/port/username/password)".into(),
            ));
        }

        let mut endpoint = SmtpEndpointConfig::new(host, username, password)
            .with_port(self.port)
            .with_encryption(self.encryption)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(name) = non_empty(self.client_name.as_deref()) {
            endpoint = endpoint.with_client_name(name);
        }
        Ok(Some(endpoint))
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("encryption", &self.encryption)
            .field("client_name", &self.client_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete() -> SmtpSettings {
        SmtpSettings {
            host: Some(" smtp.example.com ".into()),
            username: Some("noreply@example.com".into()),
            password: Some("secret".into()),
            ..SmtpSettings::default()
        }
    }

    #[test]
    fn deserializes_partial_json() {
        let config: MailerConfig = serde_json::from_str(
            r#"{"smtp": {"host": "smtp.example.com", "encryption": "SSL", "timeout": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.encryption, EncryptionMode::ImplicitTls);
        assert_eq!(config.smtp.timeout, 2);
        assert_eq!(config.smtp.username, None);
    }

    #[test]
    fn empty_json_is_default() {
        let config: MailerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MailerConfig::default());
    }

    #[test]
    fn incomplete_settings_have_no_endpoint() {
        assert!(SmtpSettings::default().endpoint().unwrap().is_none());

        let mut settings = complete();
        settings.password = Some(String::new());
        assert!(settings.endpoint().unwrap().is_none());

        let mut settings = complete();
        settings.username = Some("   ".into());
        assert!(settings.endpoint().unwrap().is_none());
    }

    #[test]
    fn complete_settings_build_endpoint() {
        let mut settings = complete();
        settings.encryption = "tls".into();
        settings.timeout = 1;
        settings.client_name = Some("relay.example.com".into());

        let endpoint = settings.endpoint().unwrap().unwrap();
        assert_eq!(endpoint.host(), "smtp.example.com");
        assert_eq!(endpoint.port(), 587);
        assert_eq!(endpoint.encryption(), EncryptionMode::StartTls);
        assert_eq!(endpoint.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn zero_port_is_config_error() {
        let mut settings = complete();
        settings.port = 0;
        assert!(matches!(settings.endpoint(), Err(SendError::Config(_))));
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", complete());
        assert!(!rendered.contains("secret"));
    }
}
