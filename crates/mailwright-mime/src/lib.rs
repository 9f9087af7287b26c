//! # mailwright-mime
//!
//! Builds the RFC 5322 text of a single-part, plain-text message.
//!
//! ## Features
//!
//! - **Address handling**: extract the bare address from `Name <addr>` forms
//!   and format display-name mailboxes
//! - **Header safety**: CR/LF stripped from every value before it is emitted
//! - **Encoded-words**: RFC 2047 base64 encoding for non-ASCII names and subjects
//! - **Body normalization**: CRLF canonicalization and RFC 5321 dot-stuffing
//!
//! ## Quick Start
//!
//! ```
//! use mailwright_mime::MessageBuilder;
//!
//! let message = MessageBuilder::new("noreply@example.com", "Han Solo <han@example.com>")
//!     .from_name("Example Security Team")
//!     .subject("Verify your account")
//!     .body("Hello!\n.\nBye")
//!     .build()
//!     .unwrap();
//!
//! let payload = message.to_smtp_payload();
//! assert!(payload.ends_with(b"Hello!\r\n..\r\nBye"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod body;
mod error;
mod header;
mod message;

pub mod encoding;

pub use address::{domain_of, extract_email_address, format_address};
pub use body::{dot_stuff, normalize_line_endings};
pub use error::{Error, Result};
pub use header::{Headers, sanitize_header_value};
pub use message::{Message, MessageBuilder, format_date, generate_message_id};
