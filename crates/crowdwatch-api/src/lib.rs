//! Crowd telemetry API server.
//!
//! This crate serves per-zone crowd metrics and staffing recommendations as
//! JSON over a deliberately small HTTP/1.1 surface:
//!
//! - `GET /api/v1/health` -- service health
//! - `GET /api/v1/zone/{id}/metrics` -- metric time series of one zone
//! - `GET /api/v1/heatmap` -- static heatmap sample
//! - `GET /api/v1/recommendations` -- all staffing recommendations
//!
//! # Architecture
//!
//! ```text
//! accept loop --(task per connection)--> read --> parse request line
//!     --> route --> MetricsStore (locked copy) --> JSON body --> write --> close
//! ```
//!
//! The [`MetricsStore`] is the only shared mutable state. It is created and
//! initialized by the caller, then handed to the server behind an
//! [`Arc`](std::sync::Arc); every store operation holds its single mutex for
//! the whole read or append. Everything else a handler touches is local to
//! its connection. There is no keep-alive: one request, one response, close.
//!
//! [`MetricsStore`]: store::MetricsStore

pub mod connection;
pub mod error;
pub mod handlers;
pub mod json;
pub mod request;
pub mod response;
pub mod router;
pub mod seed;
pub mod server;
pub mod startup;
pub mod store;

// Re-export primary types for convenience.
pub use connection::{handle_connection, ConnectionOutcome};
pub use error::RequestError;
pub use response::{Response, Status};
pub use router::{resolve, Route};
pub use server::{bind, serve, start_server, ServerConfig, ServerError};
pub use startup::{spawn_server, SpawnedServer, StartupError};
pub use store::{MetricsStore, StoreConfig, StoreError};
