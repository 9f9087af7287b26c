//! Transport security mode.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// How the connection is secured.
///
/// Parsed once from free-form configuration strings; parsing never fails:
///
/// | input (case-insensitive) | mode |
/// |---|---|
/// | `none` | [`EncryptionMode::None`] |
/// | `ssl` | [`EncryptionMode::ImplicitTls`] |
/// | `tls`, `starttls`, anything else | [`EncryptionMode::StartTls`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(from = "String", into = "String")
)]
pub enum EncryptionMode {
    /// Plain TCP for the whole session.
    None,
    /// Plain TCP, upgraded with `STARTTLS` after the first greeting.
    #[default]
    StartTls,
    /// TLS from the first byte (usually port 465).
    ImplicitTls,
}

impl EncryptionMode {
    /// Normalizes a configuration label.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "ssl" => Self::ImplicitTls,
            _ => Self::StartTls,
        }
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::StartTls => "starttls",
            Self::ImplicitTls => "ssl",
        }
    }
}

impl FromStr for EncryptionMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for EncryptionMode {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl From<String> for EncryptionMode {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<EncryptionMode> for String {
    fn from(mode: EncryptionMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
