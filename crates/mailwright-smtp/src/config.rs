//! Endpoint configuration for one submission server.

use crate::types::{Address, EncryptionMode};
use rustls::ClientConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Submission port used when none is configured.
pub const DEFAULT_PORT: u16 = 587;

/// Per-operation timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Lower bound for the per-operation timeout.
pub const MIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to submit mail.
///
/// The timeout applies to the connect and to every individual read or write,
/// not to the whole send.
#[derive(Clone)]
pub struct SmtpEndpointConfig {
    host: String,
    port: u16,
    username: String,
    password: String,
    encryption: EncryptionMode,
    client_name: Option<String>,
    timeout: Duration,
    tls_config: Option<Arc<ClientConfig>>,
}

impl SmtpEndpointConfig {
    /// Creates a configuration with the default port, STARTTLS and timeout.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            encryption: EncryptionMode::default(),
            client_name: None,
            timeout: DEFAULT_TIMEOUT,
            tls_config: None,
        }
    }

    /// Sets the server port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the transport security mode.
    #[must_use]
    pub const fn with_encryption(mut self, encryption: EncryptionMode) -> Self {
        self.encryption = encryption;
        self
    }

    /// Sets the name announced in EHLO/HELO.
    ///
    /// Whitespace, control characters and angle brackets are removed, so the
    /// name cannot break the command line or the Message-ID.
    #[must_use]
    pub fn with_client_name(mut self, name: impl AsRef<str>) -> Self {
        let name: String = name
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '<' | '>'))
            .collect();
        self.client_name = Some(name);
        self
    }

    /// Uses a custom rustls configuration instead of the bundled web PKI
    /// roots, e.g. for a private CA.
    #[must_use]
    pub fn with_tls_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Sets the per-operation timeout, raised to [`MIN_TIMEOUT`] if lower.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(MIN_TIMEOUT);
        self
    }

    /// Server host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login secret.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Transport security mode.
    #[must_use]
    pub const fn encryption(&self) -> EncryptionMode {
        self.encryption
    }

    /// Per-operation timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Custom TLS configuration, if one was set.
    #[must_use]
    pub const fn tls_config(&self) -> Option<&Arc<ClientConfig>> {
        self.tls_config.as_ref()
    }

    /// Name to announce for a given sender.
    ///
    /// Uses the configured name when non-empty, then the sender's domain,
    /// then `localhost`.
    #[must_use]
    pub fn client_name_for<'a>(&'a self, sender: &'a Address) -> &'a str {
        match self.client_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !sender.domain().is_empty() => sender.domain(),
            _ => "localhost",
        }
    }
}

impl fmt::Debug for SmtpEndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpEndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("encryption", &self.encryption)
            .field("client_name", &self.client_name)
            .field("timeout", &self.timeout)
            .field("custom_tls", &self.tls_config.is_some())
            .finish()
    }
}
