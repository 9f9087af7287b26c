//! Mailbox formatting helpers.

use crate::encoding::{encode_rfc2047, needs_encoding};

/// Extracts the bare address from `Name <addr>`, `"Name" <addr>` or `addr`.
///
/// The content of the first non-empty `<...>` pair wins; otherwise the whole
/// input is returned. Surrounding whitespace is always trimmed.
#[must_use]
pub fn extract_email_address(value: &str) -> &str {
    for (open, _) in value.match_indices('<') {
        let rest = &value[open + 1..];
        if let Some(close) = rest.find('>')
            && close > 0
        {
            return rest[..close].trim();
        }
    }
    value.trim()
}

/// Returns the domain part of an address, if it has one.
#[must_use]
pub fn domain_of(address: &str) -> Option<&str> {
    extract_email_address(address)
        .split_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}

/// Formats a mailbox for a `From`/`To`/`Reply-To` header.
///
/// Display names lose quotes and line breaks. The address loses whitespace,
/// control characters and angle brackets, so it can never end the header
/// line. An ASCII name is quoted; a name that needs RFC 2047 encoding is
/// emitted as bare encoded-words, since encoded-words are not allowed inside
/// a quoted string.
#[must_use]
pub fn format_address(name: Option<&str>, email: &str) -> String {
    let address = strip_unsafe(extract_email_address(email));
    let name = name
        .map(|n| n.replace(['"', '\r', '\n'], ""))
        .unwrap_or_default();
    let name = name.trim();

    if name.is_empty() {
        address
    } else if needs_encoding(name) {
        format!("{} <{address}>", encode_rfc2047(name))
    } else {
        format!("\"{name}\" <{address}>")
    }
}

/// Drops every character that is not allowed in a bare address token.
pub(crate) fn strip_unsafe(value: &str) -> String {
    value
        .chars()
        .filter(|c| !(c.is_whitespace() || c.is_control() || matches!(c, '<' | '>')))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bracketed() {
        assert_eq!(
            extract_email_address("Han Solo <han@example.com>"),
            "han@example.com"
        );
        assert_eq!(
            extract_email_address("\"Solo, Han\" < han@example.com >"),
            "han@example.com"
        );
    }

    #[test]
    fn test_extract_bare() {
        assert_eq!(extract_email_address("han@example.com"), "han@example.com");
        assert_eq!(extract_email_address("  han@example.com\t"), "han@example.com");
    }

    #[test]
    fn test_extract_skips_empty_brackets() {
        assert_eq!(
            extract_email_address("odd <> name <leia@example.com>"),
            "leia@example.com"
        );
    }

    #[test]
    fn test_extract_unclosed_bracket() {
        assert_eq!(extract_email_address("Han <han@example.com"), "Han <han@example.com");
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("noreply@swg.example"), Some("swg.example"));
        assert_eq!(domain_of("Team <noreply@swg.example>"), Some("swg.example"));
        assert_eq!(domain_of("localpart"), None);
        assert_eq!(domain_of("trailing@"), None);
    }

    #[test]
    fn test_format_without_name() {
        assert_eq!(format_address(None, "han@example.com"), "han@example.com");
        assert_eq!(format_address(Some("   "), "han@example.com"), "han@example.com");
    }

    #[test]
    fn test_format_ascii_name() {
        assert_eq!(
            format_address(Some("Han Solo"), "Han <han@example.com>"),
            "\"Han Solo\" <han@example.com>"
        );
    }

    #[test]
    fn test_format_strips_quotes_and_newlines() {
        assert_eq!(
            format_address(Some("\"Evil\"\r\nBcc: x@y"), "han@example.com"),
            "\"EvilBcc: x@y\" <han@example.com>"
        );
    }

    #[test]
    fn test_format_address_cannot_break_the_header_line() {
        let formatted = format_address(None, "han@example.com\r\nBcc: victim@evil.example");
        assert_eq!(formatted, "han@example.comBcc:victim@evil.example");

        let formatted = format_address(Some("Han"), "Han <han@example.com\n\tX-Evil: 1>");
        assert_eq!(formatted, "\"Han\" <han@example.comX-Evil:1>");
    }

    #[test]
    fn test_format_encodes_non_ascii_name() {
        assert_eq!(
            format_address(Some("Héllo"), "h@example.com"),
            "=?UTF-8?B?SMOpbGxv?= <h@example.com>"
        );
    }
}
