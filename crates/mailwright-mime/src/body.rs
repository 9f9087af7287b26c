//! Body normalization for the DATA phase.

/// Converts any mixture of `\r\n`, `\r` and `\n` into `\r\n`.
///
/// Text that already uses CRLF everywhere is returned unchanged.
#[must_use]
pub fn normalize_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 32);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            _ => out.push(ch),
        }
    }

    out
}

/// Applies RFC 5321 section 4.5.2 transparency to CRLF text.
///
/// Every line beginning with `.` gets one more `.` so that a line holding a
/// single dot can never be read as the end-of-data marker.
#[must_use]
pub fn dot_stuff(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);

    for (idx, line) in text.split("\r\n").enumerate() {
        if idx > 0 {
            out.push_str("\r\n");
        }
        if line.starts_with('.') {
            out.push('.');
        }
        out.push_str(line);
    }

    out
}
