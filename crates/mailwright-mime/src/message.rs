//! Plain-text message composition.

use crate::address::{domain_of, extract_email_address, format_address, strip_unsafe};
use crate::body::{dot_stuff, normalize_line_endings};
use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use crate::header::{Headers, sanitize_header_value};
use chrono::{DateTime, Utc};
use std::fmt::{self, Write as _};

/// Formats a timestamp the way RFC 5322 `Date` expects, always in UTC.
#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Generates `<32 hex chars@domain>` from 16 random bytes.
#[must_use]
pub fn generate_message_id(domain: &str) -> String {
    let bytes: [u8; 16] = rand::random();
    let mut id = String::with_capacity(34 + domain.len());
    id.push('<');
    for byte in bytes {
        let _ = write!(id, "{byte:02x}");
    }
    let _ = write!(id, "@{domain}>");
    id
}

/// Builder for a single-part `text/plain` message.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    from: String,
    from_name: Option<String>,
    to: String,
    to_name: Option<String>,
    reply_to: Option<String>,
    subject: String,
    body: String,
    message_id_domain: Option<String>,
    date: Option<DateTime<Utc>>,
}

impl MessageBuilder {
    /// Starts a message between two addresses (bare or `Name <addr>` form).
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            from_name: None,
            to: to.into(),
            to_name: None,
            reply_to: None,
            subject: String::new(),
            body: String::new(),
            message_id_domain: None,
            date: None,
        }
    }

    /// Sets the sender display name.
    #[must_use]
    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    /// Sets the recipient display name.
    #[must_use]
    pub fn to_name(mut self, name: impl Into<String>) -> Self {
        self.to_name = Some(name.into());
        self
    }

    /// Adds a `Reply-To` header pointing at `address`.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Overrides the domain used for the `Message-ID`.
    ///
    /// Defaults to the sender's domain, or `localhost`.
    #[must_use]
    pub fn message_id_domain(mut self, domain: impl Into<String>) -> Self {
        self.message_id_domain = Some(domain.into());
        self
    }

    /// Pins the `Date` header instead of using the current time.
    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Composes the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender or recipient address is empty.
    pub fn build(self) -> Result<Message> {
        if extract_email_address(&self.from).is_empty() {
            return Err(Error::MissingHeader("From"));
        }
        if extract_email_address(&self.to).is_empty() {
            return Err(Error::MissingHeader("To"));
        }

        let from = format_address(self.from_name.as_deref(), &self.from);
        let domain = self
            .message_id_domain
            .filter(|d| !d.trim().is_empty())
            .or_else(|| domain_of(&self.from).map(str::to_string))
            .unwrap_or_else(|| "localhost".to_string());
        let message_id = generate_message_id(&strip_unsafe(&domain));

        let mut headers = Headers::new();
        headers.add("From", from);
        if let Some(reply_to) = &self.reply_to {
            headers.add("Reply-To", format_address(None, reply_to));
        }
        headers.add("To", format_address(self.to_name.as_deref(), &self.to));
        headers.add(
            "Subject",
            encode_rfc2047(&sanitize_header_value(&self.subject)),
        );
        headers.add("Date", format_date(self.date.unwrap_or_else(Utc::now)));
        headers.add("Message-ID", message_id.clone());
        headers.add("MIME-Version", "1.0");
        headers.add("Content-Type", "text/plain; charset=UTF-8");
        headers.add("Content-Transfer-Encoding", "8bit");

        Ok(Message {
            headers,
            body: normalize_line_endings(&self.body),
            message_id,
        })
    }
}

/// A composed message: header block plus CRLF-normalized body.
#[derive(Debug, Clone)]
pub struct Message {
    headers: Headers,
    body: String,
    message_id: String,
}

impl Message {
    /// Returns the header block.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body with CRLF line endings, before dot-stuffing.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the `Message-ID` value including angle brackets.
    #[must_use]
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Renders the bytes written after `DATA`: headers, blank line and
    /// dot-stuffed body. The end-of-data terminator is not included.
    #[must_use]
    pub fn to_smtp_payload(&self) -> Vec<u8> {
        format!("{}\r\n{}", self.headers, dot_stuff(&self.body)).into_bytes()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n{}", self.headers, self.body)
    }
}
