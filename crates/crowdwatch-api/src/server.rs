//! Listener lifecycle and the accept loop.
//!
//! [`bind`] opens the listening socket (address reuse on, bounded backlog)
//! and [`serve`] accepts connections forever, spawning one Tokio task per
//! connection. Fan-out is unbounded unless [`ServerConfig::max_connections`]
//! is non-zero, in which case a semaphore caps the number of live handlers.
//! Per-connection failures stay inside their task. An accept error is
//! logged and the loop pauses for [`ACCEPT_ERROR_BACKOFF`] before accepting
//! again, so a persistent failure such as descriptor exhaustion does not spin.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{info, info_span, trace, warn, Instrument};

use crate::connection::handle_connection;
use crate::store::MetricsStore;

/// Configuration for the API listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host address to bind to: an IPv4 or IPv6 literal (`0.0.0.0`,
    /// `::`, `[::1]`) or `localhost`. Other hostnames are not resolved.
    pub host: String,
    /// The TCP port to listen on. `0` picks an ephemeral port.
    pub port: u16,
    /// Listen backlog passed to `listen(2)`.
    pub backlog: u32,
    /// Maximum number of connections handled at once (0 = unlimited).
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            backlog: 128,
            max_connections: 0,
        }
    }
}

impl ServerConfig {
    /// Resolve `host` and `port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let host = self.host.trim();
        let ip = if host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            let literal = host
                .strip_prefix('[')
                .and_then(|h| h.strip_suffix(']'))
                .unwrap_or(host);
            literal.parse::<IpAddr>().map_err(|e| {
                ServerError::Bind(format!("invalid host {:?}: {e}", self.host))
            })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Errors that can occur when starting the API server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to create, configure, or bind the listening socket.
    #[error("bind error: {0}")]
    Bind(String),
}

/// Pause after a failed `accept` before trying again.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(250);

/// Open the listening socket described by `config`.
pub fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.socket_addr()?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(|e| ServerError::Bind(format!("socket creation failed: {e}")))?;

    socket
        .set_reuseaddr(true)
        .map_err(|e| ServerError::Bind(format!("SO_REUSEADDR failed: {e}")))?;
    socket
        .bind(addr)
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;
    socket
        .listen(config.backlog)
        .map_err(|e| ServerError::Bind(format!("listen failed on {addr}: {e}")))
}

/// Accept connections on `listener` forever.
///
/// Each accepted connection is handled on its own task inside a `connection`
/// span. When `max_connections` is non-zero, the loop waits for a free slot
/// before spawning, so excess clients queue in the backlog instead of being
/// refused.
pub async fn serve(listener: TcpListener, store: Arc<MetricsStore>, max_connections: usize) {
    let limiter = (max_connections > 0).then(|| Arc::new(Semaphore::new(max_connections)));

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                accept_backoff(&e).await;
                continue;
            }
        };

        let permit = match &limiter {
            Some(semaphore) => match Arc::clone(semaphore).acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    warn!(%peer, error = %e, "connection limiter closed, dropping connection");
                    continue;
                }
            },
            None => None,
        };

        let store = Arc::clone(&store);
        tokio::spawn(
            async move {
                let outcome = handle_connection(stream, &store).await;
                trace!(?outcome, "connection closed");
                drop(permit);
            }
            .instrument(info_span!("connection", %peer)),
        );
    }
}

async fn accept_backoff(error: &std::io::Error) {
    warn!(error = %error, backoff = ?ACCEPT_ERROR_BACKOFF, "accept failed");
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

/// Bind according to `config` and serve until the process is terminated.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the listener cannot be opened. Once
/// serving, the function does not return.
pub async fn start_server(config: &ServerConfig, store: Arc<MetricsStore>) -> Result<(), ServerError> {
    let listener = bind(config)?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local address unavailable: {e}")))?;

    info!(%addr, max_connections = config.max_connections, "API server listening");

    serve(listener, store, config.max_connections).await;
    Ok(())
}
