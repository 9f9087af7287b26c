//! SMTP response parser.

use crate::types::{Reply, ReplyCode};

/// A reply line that does not start with a three digit code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed reply line: {0}")]
pub struct MalformedReply(pub String);

/// Parses an SMTP reply from response lines.
///
/// SMTP replies can be single-line or multi-line:
/// - Single: `250 OK\r\n`
/// - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
///
/// The code is taken from the first line. Lines are expected without their
/// line terminator.
///
/// # Errors
///
/// Returns an error if the reply is empty or a line is malformed.
pub fn parse_reply(lines: &[String]) -> Result<Reply, MalformedReply> {
    let Some(first) = lines.first() else {
        return Err(MalformedReply(String::new()));
    };

    let code = first
        .get(0..3)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| MalformedReply(first.clone()))?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        match line.len() {
            0..=2 => return Err(MalformedReply(line.clone())),
            3 => message.push(String::new()),
            // Skip code and separator (e.g., "250-" or "250 ")
            _ => message.push(String::from_utf8_lossy(&line.as_bytes()[4..]).into_owned()),
        }
    }

    Ok(Reply {
        code: ReplyCode::new(code),
        message,
        raw: lines.join("\r\n"),
    })
}

/// Checks if a line is the last line of a multi-line reply.
///
/// Multi-line replies use `-` in the fourth column for continuation and ` `
/// for the last line. A line shorter than four characters (a bare code) also
/// ends the reply.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.len() < 4 || line.as_bytes()[3] == b' '
}
