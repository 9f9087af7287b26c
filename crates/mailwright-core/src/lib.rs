//! # mailwright-core
//!
//! The mail client facade: one call turns an [`OutgoingMessage`] into either
//! an authenticated SMTP submission or, when no relay is configured, a hand-off
//! to the local `sendmail`.
//!
//! This crate provides:
//! - Message composition (headers, encoded words, normalized body)
//! - SMTP delivery through [`mailwright_smtp`]
//! - A pluggable local-submission fallback ([`LocalSubmission`], [`Sendmail`])
//! - Classified failures ([`SendError`], [`ErrorKind`])
//!
//! ```ignore
//! use mailwright_core::{MailerConfig, OutgoingMessage, send_email};
//!
//! let config: MailerConfig = serde_json::from_str(r#"{"smtp": {"host": "smtp.example.com",
//!     "username": "noreply@example.com", "password": "secret"}}"#)?;
//! let message = OutgoingMessage::new(
//!     "noreply@example.com",
//!     "han@example.com",
//!     "Verify your account",
//!     "Click the link below.",
//! );
//! send_email(&config, &message).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod message;
pub mod service;

pub use config::{MailerConfig, SmtpSettings};
pub use error::{Outcome, SendError};
pub use message::OutgoingMessage;
pub use service::{Delivery, LocalSubmission, Mailer, Sendmail, send_email};

pub use mailwright_smtp::{EncryptionMode, ErrorKind, Receipt, RecipientStatus};
