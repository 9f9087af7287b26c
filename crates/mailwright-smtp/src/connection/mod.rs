//! SMTP connection management with type-state pattern.

mod client;
mod stream;

pub use client::{
    Authenticated, Client, Committed, Connected, Data, Greeted, MailTransaction, RecipientAdded,
};
pub use stream::{Connector, SmtpStream, TcpConnector, open};

use crate::types::{AuthMechanism, Extension};
use std::collections::HashSet;

/// Server capabilities from the greeting exchange.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from the banner.
    pub hostname: String,
    /// Extensions advertised in the latest EHLO reply (empty after HELO).
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Checks if an AUTH mechanism is advertised.
    #[must_use]
    pub fn supports_auth(&self, mechanism: AuthMechanism) -> bool {
        self.extensions.iter().any(|ext| match ext {
            Extension::Auth(mechanisms) => mechanisms.contains(&mechanism),
            _ => false,
        })
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }
}
