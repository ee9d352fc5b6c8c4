//! Parsing of the raw text received from the peer.
//!
//! # Design
//! The parser works on the whole response at once, after the connection has
//! been closed. It does not look at `Content-Length` or `Transfer-Encoding`.
//! Lines are split on `\r\n`, `\n`, a lone `\r`, and the other line
//! boundaries recognised by Unicode-aware line splitting (vertical tab, form
//! feed, the `\x1c`..`\x1e` separators, NEL, U+2028 and U+2029).
//!
//! The body is rebuilt by concatenating every line after the first blank
//! line, without putting the line breaks back. A multi-line body therefore
//! comes back joined into one line.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Outcome of one request/response cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub code: u16,
    pub body: Option<String>,
}

impl fmt::Display for HttpResponse {
    /// Prints the body alone, or nothing when there is none.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.body.as_deref().unwrap_or_default())
    }
}

/// Response text exactly as it came off the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse(String);

impl RawResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn code(&self) -> Result<u16> {
        get_code(&self.0)
    }

    pub fn headers(&self) -> &str {
        get_headers(&self.0)
    }

    pub fn body(&self) -> Option<String> {
        get_body(&self.0)
    }

    /// Extract the status code and body.
    pub fn parse(&self) -> Result<HttpResponse> {
        Ok(HttpResponse {
            code: self.code()?,
            body: self.body(),
        })
    }
}

impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status code from the second space-separated token of the first line.
///
/// # Errors
/// [`ClientError::MalformedResponse`] when the response is empty, the first
/// line has fewer than two tokens, or the token is not a number.
pub fn get_code(raw: &str) -> Result<u16> {
    let status_line = split_lines(raw)
        .next()
        .ok_or_else(|| ClientError::MalformedResponse("empty response".to_string()))?;

    let token = status_line.split(' ').nth(1).ok_or_else(|| {
        ClientError::MalformedResponse(format!("status line has no status code: {status_line:?}"))
    })?;

    token.parse().map_err(|_| {
        ClientError::MalformedResponse(format!("status code is not a number: {token:?}"))
    })
}

/// Raw header block: everything before the first `\r\n\r\n`, status line
/// included. The whole text when there is no separator.
pub fn get_headers(raw: &str) -> &str {
    raw.split_once("\r\n\r\n").map_or(raw, |(head, _)| head)
}

/// Lines after the first blank line, concatenated without separators.
///
/// `None` when there is no blank line or nothing follows it.
pub fn get_body(raw: &str) -> Option<String> {
    let mut lines = split_lines(raw);
    if !lines.by_ref().any(str::is_empty) {
        return None;
    }

    let mut rest = lines.peekable();
    rest.peek()?;
    Some(rest.collect())
}

/// Whether `c` ends a line. `\r\n` counts as one terminator.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split on every [`is_line_break`] terminator. A trailing terminator does
/// not produce a final empty line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((idx, c)) => {
                let line = &rest[..idx];
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { c.len_utf8() };
                rest = &rest[idx + skip..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}
