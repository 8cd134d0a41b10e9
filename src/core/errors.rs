// src/core/errors.rs

//! Defines the error type shared by the sessioned client and its collaborators.

use std::sync::Arc;
use thiserror::Error;

/// A convenient alias for results produced by transport clients, factories and executors.
pub type Result<T> = std::result::Result<T, TransportError>;

/// The failures that can cross the transport layer.
///
/// Factories report `Connect` when they cannot produce a client, executors surface
/// whatever their request produced, and `Shutdown` is only ever logged by the
/// sessioned client, never returned to a caller.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Raised by executors and factories through `?` on an `io::Result`.
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Failed to create client: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to shut down client: {0}")]
    Shutdown(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Metrics Error: {0}")]
    Metrics(String),

    /// For executors and factories reporting a broken invariant of their own,
    /// such as a request issued against a client they already closed.
    #[error("Internal Error: {0}")]
    Internal(String),
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
impl Clone for TransportError {
    fn clone(&self) -> Self {
        match self {
            TransportError::Io(e) => TransportError::Io(Arc::clone(e)),
            TransportError::Connect(s) => TransportError::Connect(s.clone()),
            TransportError::Request(s) => TransportError::Request(s.clone()),
            TransportError::Timeout => TransportError::Timeout,
            TransportError::Shutdown(s) => TransportError::Shutdown(s.clone()),
            TransportError::Config(s) => TransportError::Config(s.clone()),
            TransportError::Metrics(s) => TransportError::Metrics(s.clone()),
            TransportError::Internal(s) => TransportError::Internal(s.clone()),
        }
    }
}

impl PartialEq for TransportError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TransportError::Io(e1), TransportError::Io(e2)) => e1.to_string() == e2.to_string(),
            (TransportError::Connect(s1), TransportError::Connect(s2)) => s1 == s2,
            (TransportError::Request(s1), TransportError::Request(s2)) => s1 == s2,
            (TransportError::Shutdown(s1), TransportError::Shutdown(s2)) => s1 == s2,
            (TransportError::Config(s1), TransportError::Config(s2)) => s1 == s2,
            (TransportError::Metrics(s1), TransportError::Metrics(s2)) => s1 == s2,
            (TransportError::Internal(s1), TransportError::Internal(s2)) => s1 == s2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

// --- From trait implementations for easy error conversion ---
// Executors and factories rely on these to use `?` on io and timeout results.

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(Arc::new(e))
    }
}

impl From<tokio::time::error::Elapsed> for TransportError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        TransportError::Timeout
    }
}

impl From<prometheus::Error> for TransportError {
    fn from(e: prometheus::Error) -> Self {
        TransportError::Metrics(e.to_string())
    }
}
