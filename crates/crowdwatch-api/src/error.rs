//! Error types for the request pipeline.
//!
//! [`RequestError`] covers everything that can go wrong between reading the
//! bytes of a request and routing it. It converts into an HTTP [`Response`]
//! via [`RequestError::into_response`], so no request error ever escapes a
//! connection handler.

use crate::response::Response;

/// Errors raised while turning raw bytes into a routable request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Nothing was read; the client closed the connection.
    #[error("empty request")]
    Empty,

    /// The request line has fewer than two whitespace-separated tokens.
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),
}

impl RequestError {
    /// The response sent for this error, if any.
    ///
    /// An empty request gets no response: the peer is already gone.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Empty => None,
            Self::MalformedRequestLine(_) => Some(Response::bad_request()),
        }
    }
}
