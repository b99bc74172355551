//! HTTP/1.1 response envelope.
//!
//! Every response uses the same header block: JSON content type, exact
//! `Content-Length`, a permissive CORS origin, and `Connection: close`.

use crate::json;

/// Response status line values used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `200 OK`
    Ok,
    /// `400 Bad Request`
    BadRequest,
    /// `404 Not Found`
    NotFound,
}

impl Status {
    /// Numeric status code.
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
        }
    }

    /// Code and reason phrase as written on the status line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "200 OK",
            Self::BadRequest => "400 Bad Request",
            Self::NotFound => "404 Not Found",
        }
    }
}

/// A complete response: status plus JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status line value.
    pub status: Status,
    /// JSON body.
    pub body: String,
}

impl Response {
    /// `200 OK` with the given JSON body.
    pub const fn ok(body: String) -> Self {
        Self {
            status: Status::Ok,
            body,
        }
    }

    /// `404 Not Found` with the fixed error body.
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            body: String::from(json::NOT_FOUND_BODY),
        }
    }

    /// `400 Bad Request` with the fixed error body.
    pub fn bad_request() -> Self {
        Self {
            status: Status::BadRequest,
            body: String::from(json::BAD_REQUEST_BODY),
        }
    }

    /// Serialize status line, headers, and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Connection: close\r\n\
             \r\n",
            self.status.as_str(),
            self.body.len()
        );
        let mut bytes = Vec::with_capacity(head.len().saturating_add(self.body.len()));
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}
