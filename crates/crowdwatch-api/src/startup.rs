//! Background startup helper.
//!
//! Provides [`spawn_server`] which binds the listener eagerly and then runs
//! the accept loop on a background Tokio task. Binding before spawning means
//! the caller learns about an unavailable port immediately and gets the
//! actual bound address back (useful with port `0`).
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crowdwatch_api::{spawn_server, MetricsStore, ServerConfig};
//!
//! let store = Arc::new(MetricsStore::default());
//! store.initialize().await?;
//! let server = spawn_server(&ServerConfig::default(), store)?;
//! println!("listening on {}", server.local_addr);
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{bind, serve, ServerConfig, ServerError};
use crate::store::MetricsStore;

/// Errors that can occur when spawning the API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),

    /// The bound socket did not report its local address.
    #[error("local address unavailable: {0}")]
    LocalAddr(#[from] std::io::Error),
}

/// A server running on a background task.
#[derive(Debug)]
pub struct SpawnedServer {
    /// The address the listener is bound to.
    pub local_addr: SocketAddr,
    /// Handle of the accept-loop task. Abort it to stop accepting.
    pub handle: JoinHandle<()>,
}

/// Bind per `config` and run the accept loop on a background task.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_server(
    config: &ServerConfig,
    store: Arc<MetricsStore>,
) -> Result<SpawnedServer, StartupError> {
    let listener = bind(config)?;
    let local_addr = listener.local_addr()?;
    let max_connections = config.max_connections;

    let handle = tokio::spawn(serve(listener, store, max_connections));

    tracing::info!(%local_addr, "API server spawned on background task");

    Ok(SpawnedServer { local_addr, handle })
}
