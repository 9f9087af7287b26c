//! # mailwright-smtp
//!
//! A small outbound SMTP client implementing the subset of RFC 5321 needed to
//! hand one message to an authenticated submission server.
//!
//! ## Features
//!
//! - **Type-state connection management**: compile-time enforcement of the
//!   command order (greet, optional STARTTLS, AUTH, MAIL, RCPT, DATA)
//! - **Greeting**: EHLO with a single HELO fallback
//! - **TLS support**: both implicit TLS (port 465) and STARTTLS with a
//!   mandatory re-greeting (RFC 3207)
//! - **Authentication**: AUTH LOGIN
//! - **Step-tagged errors**: every failure names the protocol step it
//!   happened in and classifies itself into an [`ErrorKind`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailwright_smtp::{Address, Envelope, SmtpEndpointConfig, TcpConnector, deliver};
//!
//! #[tokio::main]
//! async fn main() -> mailwright_smtp::Result<()> {
//!     let config = SmtpEndpointConfig::new("smtp.example.com", "user@example.com", "secret")
//!         .with_port(587)
//!         .with_encryption("starttls".into());
//!
//!     let envelope = Envelope::new(
//!         Address::new("user@example.com")?,
//!         Address::new("recipient@example.com")?,
//!     );
//!
//!     let payload = b"Subject: Test\r\n\r\nHello, World!\r\n";
//!     let receipt = deliver(&TcpConnector, &config, &envelope, payload).await?;
//!     println!("accepted: {:?}", receipt.recipient);
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! Connected ── ehlo() ──→ Greeted ── starttls() ──→ Greeted
//!                            │
//!                            └── auth_login() ──→ Authenticated
//!                                                     │
//!   Committed ←── send_message() ── Data ←── data() ──┤
//!                                                     │
//!           mail_from() ──→ MailTransaction ── rcpt_to() ──→ RecipientAdded
//! ```
//!
//! Dropping a client at any state closes its socket.
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: transport, TLS and the type-state client
//! - [`parser`]: reply parser
//! - [`types`]: core SMTP types (addresses, steps, replies)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
mod config;
pub mod connection;
mod delivery;
mod error;
pub mod parser;
pub mod types;

pub use config::{DEFAULT_PORT, DEFAULT_TIMEOUT, MIN_TIMEOUT, SmtpEndpointConfig};
pub use connection::{
    Authenticated, Client, Committed, Connected, Connector, Data, Greeted, MailTransaction,
    RecipientAdded, ServerInfo, SmtpStream, TcpConnector,
};
pub use delivery::{Envelope, deliver};
pub use error::{Error, ErrorKind, Result};
pub use types::{
    Address, AuthMechanism, EncryptionMode, Extension, Receipt, RecipientStatus, Reply,
    ReplyCode, Step,
};
