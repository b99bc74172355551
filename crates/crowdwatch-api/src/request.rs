//! Request-line parsing.
//!
//! The server reads a request with a single `read` into a
//! [`READ_BUFFER_SIZE`] buffer and only looks at the first line of what
//! arrived. Headers and bodies are never inspected, and anything past the
//! buffer is silently truncated.

use crate::error::RequestError;

/// Size of the buffer a request is read into.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Method and path taken from an HTTP request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// The request method, e.g. `GET`. Not validated.
    pub method: String,
    /// The raw request target, including any query string.
    pub path: String,
}

/// Extract the method and path from the first line of `raw`.
///
/// The first line ends at the first `\n` (a trailing `\r` is whitespace and
/// dropped by the split). Invalid UTF-8 is replaced rather than rejected.
pub fn parse_request_line(raw: &[u8]) -> Result<RequestLine, RequestError> {
    if raw.is_empty() {
        return Err(RequestError::Empty);
    }

    let first_line = raw
        .split(|&b| b == b'\n')
        .next()
        .unwrap_or_default();
    let line = String::from_utf8_lossy(first_line);
    let mut tokens = line.split_whitespace();

    match (tokens.next(), tokens.next()) {
        (Some(method), Some(path)) => Ok(RequestLine {
            method: method.to_owned(),
            path: path.to_owned(),
        }),
        _ => Err(RequestError::MalformedRequestLine(line.trim_end().to_owned())),
    }
}
