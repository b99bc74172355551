//! Error types for the API server binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the API server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Seeding the metrics store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: crowdwatch_api::StoreError,
    },

    /// The listener could not be started.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: crowdwatch_api::ServerError,
    },

    /// The tracing subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
