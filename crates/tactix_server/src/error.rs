//! Structured server error types.

use thiserror::Error;

/// Failures surfaced by the server core.
///
/// Per-request validation problems never show up here: those become error
/// responses on the wire and the connection stays open. `ServerError` covers
/// the failures that stop a listener or a whole connection.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Connection, binding, and socket-level problems.
    #[error("network error: {0}")]
    Network(String),

    /// Invariant violations that should be unreachable.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Network(err.to_string())
    }
}
