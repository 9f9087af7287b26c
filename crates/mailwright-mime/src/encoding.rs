//! Header and payload encodings.
//!
//! Supports Base64 and RFC 2047 encoded-words (B encoding only).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Charset label used in every encoded-word.
const CHARSET: &str = "UTF-8";

/// Maximum length of a single encoded-word (RFC 2047 section 2).
const MAX_ENCODED_WORD: usize = 75;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Returns true if `text` cannot be placed in a header verbatim.
///
/// Non-ASCII characters, ASCII control characters and anything that would
/// itself look like an encoded-word all require encoding.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    text.chars().any(|c| !c.is_ascii() || c.is_ascii_control()) || text.contains("=?")
}

/// Encodes a header value using RFC 2047 if needed.
///
/// Format: `=?UTF-8?B?encoded-text?=`
///
/// Long values are split into several encoded-words on character
/// boundaries, each no longer than 75 characters, folded with `CRLF SP`.
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    if !needs_encoding(text) {
        return text.to_string();
    }

    let overhead = "=??B??=".len() + CHARSET.len();
    // Largest multiple of 3 bytes whose base64 form still fits
    let max_chunk = (MAX_ENCODED_WORD - overhead) / 4 * 3;

    let mut words = Vec::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if idx + ch.len_utf8() - start > max_chunk {
            words.push(encode_word(&text[start..idx]));
            start = idx;
        }
    }
    words.push(encode_word(&text[start..]));

    words.join("\r\n ")
}

fn encode_word(chunk: &str) -> String {
    format!("=?{CHARSET}?B?{}?=", encode_base64(chunk.as_bytes()))
}
