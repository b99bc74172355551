//! Per-connection request handling.
//!
//! A connection moves through `Accepted → Reading → Parsed → Routed →
//! Responding → Closed` and always ends closed. Exactly one request is
//! served per connection: the handler performs a single read, answers, and
//! shuts the stream down whether or not the write succeeded.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::handlers;
use crate::request::{parse_request_line, READ_BUFFER_SIZE};
use crate::response::{Response, Status};
use crate::router;
use crate::store::MetricsStore;

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// A response with this status was written in full.
    Responded(Status),
    /// The read returned no bytes or failed; nothing was sent.
    Disconnected,
    /// A response with this status was produced but the write failed.
    WriteFailed(Status),
}

/// Serve one request on `stream` and close it.
///
/// Generic over the stream so it runs the same on a `TcpStream` and on an
/// in-memory duplex pipe.
pub async fn handle_connection<S>(mut stream: S, store: &MetricsStore) -> ConnectionOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0_u8; READ_BUFFER_SIZE];
    let read = match stream.read(&mut buf).await {
        Ok(0) => {
            trace!("client closed before sending a request");
            close(&mut stream).await;
            return ConnectionOutcome::Disconnected;
        }
        Ok(n) => n,
        Err(e) => {
            trace!(error = %e, "read failed");
            close(&mut stream).await;
            return ConnectionOutcome::Disconnected;
        }
    };

    let raw = buf.get(..read).unwrap_or_default();
    let response = match parse_request_line(raw) {
        Ok(line) => {
            debug!(method = %line.method, path = %line.path, "request");
            let route = router::resolve(&line.path);
            handlers::handle(route, store).await
        }
        Err(e) => {
            debug!(error = %e, "rejecting request");
            match e.into_response() {
                Some(response) => response,
                None => {
                    close(&mut stream).await;
                    return ConnectionOutcome::Disconnected;
                }
            }
        }
    };

    let outcome = write_response(&mut stream, &response).await;
    close(&mut stream).await;
    outcome
}

async fn write_response<S>(stream: &mut S, response: &Response) -> ConnectionOutcome
where
    S: AsyncWrite + Unpin,
{
    let status = response.status;
    match stream.write_all(&response.to_bytes()).await {
        Ok(()) => {
            debug!(status = status.code(), bytes = response.body.len(), "response sent");
            ConnectionOutcome::Responded(status)
        }
        Err(e) => {
            debug!(status = status.code(), error = %e, "response write failed");
            ConnectionOutcome::WriteFailed(status)
        }
    }
}

async fn close<S>(stream: &mut S)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = stream.shutdown().await {
        trace!(error = %e, "shutdown failed");
    }
}
