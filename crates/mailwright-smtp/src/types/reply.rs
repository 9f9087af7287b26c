//! SMTP reply types.

use std::fmt;

/// One logical reply, possibly spanning several physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Three-digit status.
    pub code: ReplyCode,
    /// Text after the code on each line.
    pub message: Vec<String>,
    /// Physical lines as received, joined with CRLF.
    pub raw: String,
}

/// Three-digit SMTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220, sent as the banner and in answer to STARTTLS.
    pub const SERVICE_READY: Self = Self(220);
    /// 221, answer to QUIT.
    pub const CLOSING: Self = Self(221);
    /// 235, AUTH accepted.
    pub const AUTH_SUCCESS: Self = Self(235);
    /// 250, generic success.
    pub const OK: Self = Self(250);
    /// 251, recipient not local; the server forwards.
    pub const FORWARD: Self = Self(251);
    /// 334, next AUTH challenge.
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354, send the message data.
    pub const START_DATA: Self = Self(354);

    /// Wraps a numeric code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
