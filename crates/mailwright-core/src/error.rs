//! Error types for the mail facade.

use crate::service::Delivery;
use mailwright_smtp::ErrorKind;
use thiserror::Error;

/// Errors that can occur while sending a message.
#[derive(Debug, Error)]
pub enum SendError {
    /// Sender, recipient or settings are unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMTP session failed.
    #[error(transparent)]
    Smtp(#[from] mailwright_smtp::Error),

    /// Message could not be composed.
    #[error("Message composition failed: {0}")]
    Compose(#[from] mailwright_mime::Error),

    /// The local mail transport rejected the message.
    #[error("Local submission failed: {0}")]
    LocalSubmission(String),
}

impl SendError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Compose(_) => ErrorKind::Config,
            Self::Smtp(err) => err.kind(),
            Self::LocalSubmission(_) => ErrorKind::Transmission,
        }
    }

    /// Short diagnostic tag naming where the send stopped.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Smtp(err) => err.tag(),
            Self::Compose(_) => "compose",
            Self::LocalSubmission(_) => "local-submission",
        }
    }
}

/// Result of a send.
pub type Outcome = std::result::Result<Delivery, SendError>;
