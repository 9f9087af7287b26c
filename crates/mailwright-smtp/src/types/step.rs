//! Protocol steps of a send.

use crate::error::ErrorKind;
use std::fmt;

/// One edge of the send state machine.
///
/// Every command/reply exchange is tagged with its step so that a failure
/// reports where the conversation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// TCP connect (and TLS handshake for implicit TLS).
    Connect,
    /// Server greeting, expects 220.
    Banner,
    /// First `EHLO`.
    Ehlo,
    /// `HELO` fallback after a rejected `EHLO`.
    Helo,
    /// `STARTTLS`, expects 220.
    StartTls,
    /// TLS handshake after `STARTTLS`.
    TlsHandshake,
    /// `EHLO` over the upgraded channel.
    EhloAfterTls,
    /// `HELO` fallback over the upgraded channel.
    HeloAfterTls,
    /// `AUTH LOGIN`, expects 334.
    AuthLogin,
    /// Base64 username, expects 334.
    AuthUser,
    /// Base64 password, expects 235.
    AuthPass,
    /// `MAIL FROM`, expects 250.
    MailFrom,
    /// `RCPT TO`, expects 250 or 251.
    RcptTo,
    /// `DATA`, expects 354.
    DataCommand,
    /// Payload plus terminator, expects 250.
    DataCommit,
    /// `QUIT`, best effort.
    Quit,
}

impl Step {
    /// Returns the diagnostic tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Banner => "banner",
            Self::Ehlo => "ehlo",
            Self::Helo => "helo",
            Self::StartTls => "starttls",
            Self::TlsHandshake => "tls-handshake",
            Self::EhloAfterTls => "ehlo-tls",
            Self::HeloAfterTls => "helo-tls",
            Self::AuthLogin => "auth-login",
            Self::AuthUser => "auth-user",
            Self::AuthPass => "auth-pass",
            Self::MailFrom => "mail-from",
            Self::RcptTo => "rcpt-to",
            Self::DataCommand => "data-cmd",
            Self::DataCommit => "data-commit",
            Self::Quit => "quit",
        }
    }

    /// Error kind reported when this step fails.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::Connect => ErrorKind::Connect,
            Self::Banner
            | Self::Ehlo
            | Self::Helo
            | Self::StartTls
            | Self::EhloAfterTls
            | Self::HeloAfterTls => ErrorKind::Protocol,
            Self::TlsHandshake => ErrorKind::TlsNegotiation,
            Self::AuthLogin | Self::AuthUser | Self::AuthPass => ErrorKind::Auth,
            Self::MailFrom | Self::RcptTo | Self::DataCommand | Self::DataCommit | Self::Quit => {
                ErrorKind::Transmission
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
