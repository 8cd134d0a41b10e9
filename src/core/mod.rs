// src/core/mod.rs

//! The central module containing the session rotation logic and the transport
//! seams it is built on.

pub mod errors;
pub mod metrics;
pub mod session;
pub mod transport;

pub use errors::{Result, TransportError};
pub use metrics::{NoopSessionMetrics, PrometheusSessionMetrics, SessionGauge, SessionMetrics};
pub use session::SessionedClient;
pub use transport::{ClientFactory, RequestExecutor, TransportClient};
