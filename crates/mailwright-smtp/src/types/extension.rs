//! Capabilities advertised in the EHLO reply.

/// One EHLO capability line.
///
/// Only the keywords this client reacts to are modeled; everything else is
/// kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `STARTTLS`
    StartTls,
    /// `AUTH` with the mechanisms this crate recognizes.
    Auth(Vec<AuthMechanism>),
    /// `SIZE`, with the limit in bytes if one was given.
    Size(Option<usize>),
    /// Anything else.
    Unknown(String),
}

impl Extension {
    /// Parses the text of one capability line (without the reply code).
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Self::Unknown(line.to_string());
        };

        if keyword.eq_ignore_ascii_case("STARTTLS") {
            Self::StartTls
        } else if keyword.eq_ignore_ascii_case("AUTH") {
            Self::Auth(words.filter_map(AuthMechanism::parse).collect())
        } else if keyword.eq_ignore_ascii_case("SIZE") {
            Self::Size(words.next().and_then(|limit| limit.parse().ok()))
        } else {
            Self::Unknown(line.to_string())
        }
    }
}

/// SASL mechanism named in an `AUTH` capability.
///
/// The client only speaks [`AuthMechanism::Login`]; the others are tracked so
/// a missing LOGIN can be reported against what the server does offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// `LOGIN`
    Login,
    /// `PLAIN`
    Plain,
    /// `CRAM-MD5`
    CramMd5,
    /// `XOAUTH2`
    XOAuth2,
}

impl AuthMechanism {
    const ALL: [Self; 4] = [Self::Login, Self::Plain, Self::CramMd5, Self::XOAuth2];

    /// Looks a mechanism up by name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mechanism| mechanism.as_str().eq_ignore_ascii_case(name))
    }

    /// Name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Plain => "PLAIN",
            Self::CramMd5 => "CRAM-MD5",
            Self::XOAuth2 => "XOAUTH2",
        }
    }
}
