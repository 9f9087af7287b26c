//! Error types for SMTP operations.

use crate::types::Step;
use std::fmt;
use std::io;
use std::time::Duration;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid sender/recipient or incomplete settings.
    Config,
    /// Socket or TLS-at-connect failure.
    Connect,
    /// A greeting-phase step got a reply outside its accepted set.
    Protocol,
    /// STARTTLS was accepted but the TLS handshake failed.
    TlsNegotiation,
    /// AUTH LOGIN was rejected.
    Auth,
    /// MAIL/RCPT/DATA or the payload itself failed.
    Transmission,
}

impl ErrorKind {
    /// Returns the kind name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Connect => "connect",
            Self::Protocol => "protocol",
            Self::TlsNegotiation => "tls-negotiation",
            Self::Auth => "auth",
            Self::Transmission => "transmission",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// TCP connect failed.
    #[error("Socket connect to {host}:{port} failed: {source}")]
    Connect {
        /// Server host.
        host: String,
        /// Server port.
        port: u16,
        /// OS-level failure.
        #[source]
        source: io::Error,
    },

    /// A read, write or handshake exceeded the configured timeout.
    #[error("Timed out after {timeout:?} during [{step}]")]
    Timeout {
        /// Step that timed out.
        step: Step,
        /// Configured limit.
        timeout: Duration,
    },

    /// I/O failure while talking to the server.
    #[error("I/O error during [{step}]: {source}")]
    Io {
        /// Step in progress.
        step: Step,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// TLS handshake failure (at connect time or after STARTTLS).
    #[error("TLS negotiation failed during [{step}]: {source}")]
    Tls {
        /// [`Step::Connect`] or [`Step::TlsHandshake`].
        step: Step,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Connection closed before any reply data arrived.
    #[error("Empty response after [{step}]")]
    EmptyResponse {
        /// Step whose reply was expected.
        step: Step,
    },

    /// Reply did not start with a three digit code.
    #[error("Malformed reply after [{step}]: {line}")]
    MalformedReply {
        /// Step whose reply was expected.
        step: Step,
        /// Offending line.
        line: String,
    },

    /// Server returned a code outside the accepted set for the step.
    #[error("Unexpected SMTP code after [{step}]: {code}. Response: {message}")]
    UnexpectedReply {
        /// Step that was rejected.
        step: Step,
        /// Reply code (e.g., 535).
        code: u16,
        /// Reply text from the server.
        message: String,
    },

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Wraps an I/O error, turning `TimedOut` into [`Error::Timeout`].
    pub(crate) fn io(step: Step, source: io::Error, timeout: Duration) -> Self {
        if source.kind() == io::ErrorKind::TimedOut {
            Self::Timeout { step, timeout }
        } else {
            Self::Io { step, source }
        }
    }

    /// Wraps a TLS handshake error, turning `TimedOut` into [`Error::Timeout`].
    pub(crate) fn tls(step: Step, source: io::Error, timeout: Duration) -> Self {
        if source.kind() == io::ErrorKind::TimedOut {
            Self::Timeout { step, timeout }
        } else {
            Self::Tls { step, source }
        }
    }

    /// Returns the protocol step the error happened in, if any.
    #[must_use]
    pub const fn step(&self) -> Option<Step> {
        match self {
            Self::Connect { .. } => Some(Step::Connect),
            Self::Timeout { step, .. }
            | Self::Io { step, .. }
            | Self::Tls { step, .. }
            | Self::EmptyResponse { step }
            | Self::MalformedReply { step, .. }
            | Self::UnexpectedReply { step, .. } => Some(*step),
            Self::InvalidAddress(_) => None,
        }
    }

    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Connect { .. } => ErrorKind::Connect,
            Self::EmptyResponse { .. } | Self::MalformedReply { .. } => ErrorKind::Protocol,
            Self::Timeout { step, .. }
            | Self::Io { step, .. }
            | Self::Tls { step, .. }
            | Self::UnexpectedReply { step, .. } => step.kind(),
            Self::InvalidAddress(_) => ErrorKind::Config,
        }
    }

    /// Short diagnostic tag: the step name, or `empty-response`.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::EmptyResponse { .. } => "empty-response",
            Self::InvalidAddress(_) => "address",
            _ => match self.step() {
                Some(step) => step.as_str(),
                None => "unknown",
            },
        }
    }

    /// True when the server answered, just not as the step required.
    ///
    /// The connection is still up after such an error, so the session can
    /// be ended politely with `QUIT`.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedReply { .. } | Self::MalformedReply { .. }
        )
    }

    /// Returns the server's reply code for rejections.
    #[must_use]
    pub const fn reply_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedReply { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    fn rejected(step: Step, code: u16) -> Error {
        Error::UnexpectedReply {
            step,
            code,
            message: "nope".into(),
        }
    }

    #[test]
    fn kind_follows_step() {
        assert_eq!(rejected(Step::Banner, 554).kind(), ErrorKind::Protocol);
        assert_eq!(rejected(Step::StartTls, 454).kind(), ErrorKind::Protocol);
        assert_eq!(rejected(Step::HeloAfterTls, 500).kind(), ErrorKind::Protocol);
        assert_eq!(rejected(Step::AuthPass, 535).kind(), ErrorKind::Auth);
        assert_eq!(rejected(Step::RcptTo, 550).kind(), ErrorKind::Transmission);
        assert_eq!(rejected(Step::DataCommit, 554).kind(), ErrorKind::Transmission);
    }

    #[test]
    fn empty_response_is_protocol_error() {
        let err = Error::EmptyResponse {
            step: Step::AuthUser,
        };
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.tag(), "empty-response");
        assert_eq!(err.step(), Some(Step::AuthUser));
    }

    #[test]
    fn timeout_is_classified_by_step() {
        let err = Error::io(
            Step::DataCommit,
            io::Error::new(io::ErrorKind::TimedOut, "slow"),
            Duration::from_secs(30),
        );
        assert!(matches!(err, Error::Timeout { .. }));
        assert_eq!(err.kind(), ErrorKind::Transmission);
        assert_eq!(err.to_string(), "Timed out after 30s during [data-commit]");
    }

    #[test]
    fn tls_errors() {
        let at_connect = Error::tls(
            Step::Connect,
            io::Error::new(io::ErrorKind::InvalidData, "bad cert"),
            Duration::from_secs(5),
        );
        assert_eq!(at_connect.kind(), ErrorKind::Connect);

        let after_starttls = Error::tls(
            Step::TlsHandshake,
            io::Error::new(io::ErrorKind::InvalidData, "bad cert"),
            Duration::from_secs(5),
        );
        assert_eq!(after_starttls.kind(), ErrorKind::TlsNegotiation);
        assert_eq!(after_starttls.tag(), "tls-handshake");
    }

    #[test]
    fn connect_error() {
        let err = Error::Connect {
            host: "smtp.example.com".into(),
            port: 587,
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert_eq!(err.kind(), ErrorKind::Connect);
        assert_eq!(err.tag(), "connect");
        assert!(err.to_string().contains("smtp.example.com:587"));
    }

    #[test]
    fn rejection_message() {
        let err = rejected(Step::MailFrom, 553);
        assert_eq!(err.reply_code(), Some(553));
        assert_eq!(
            err.to_string(),
            "Unexpected SMTP code after [mail-from]: 553. Response: nope"
        );
    }

    #[test]
    fn only_server_answers_are_rejections() {
        assert!(rejected(Step::AuthPass, 535).is_rejection());
        assert!(
            Error::MalformedReply {
                step: Step::Ehlo,
                line: "xx".into(),
            }
            .is_rejection()
        );
        assert!(!Error::EmptyResponse { step: Step::Quit }.is_rejection());
        assert!(
            !Error::io(
                Step::RcptTo,
                io::Error::new(io::ErrorKind::BrokenPipe, "gone"),
                Duration::from_secs(5),
            )
            .is_rejection()
        );
    }

    #[test]
    fn invalid_address_is_config() {
        let err = Error::InvalidAddress("no @".into());
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.step(), None);
    }
}
