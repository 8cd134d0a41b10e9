// src/core/transport.rs

//! The seams between the sessioned client and the transport it wraps: the client
//! itself, the factory that builds clients, and the per-call request executor.

use crate::core::errors::Result;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// A live connection to one backend server.
///
/// `shutdown` must be idempotent and best-effort. It is called synchronously when
/// the last handle to a retired client goes away, so implementations holding async
/// resources should hand the actual teardown to a spawned task.
pub trait TransportClient: Send + Sync + 'static {
    fn shutdown(&self) -> Result<()>;
}

/// Produces new clients on demand. Each call should yield an independent client,
/// typically connected to whatever server the factory's own selection picks next.
#[async_trait]
pub trait ClientFactory: Send + Sync + 'static {
    type Client: TransportClient;

    async fn new_client(&self) -> Result<Self::Client>;
}

/// One unit of work performed against a resolved client.
#[async_trait]
pub trait RequestExecutor<C: ?Sized + Sync>: Send {
    type Response: Send;

    async fn execute(self, client: &C) -> Result<Self::Response>;
}

/// Shuts down a client, logging instead of propagating any failure.
pub fn shutdown_quietly<C: TransportClient + ?Sized>(client: &C) {
    if let Err(e) = client.shutdown() {
        warn!("Ignoring failure while shutting down transport client: {}", e);
    }
}

/// Installs `candidate` into an empty slot, or returns the client some other caller
/// installed first. A losing candidate is dropped here, before it ever serves a request.
pub fn get_or_set_another_client<T>(slot: &ArcSwapOption<T>, candidate: Arc<T>) -> Arc<T> {
    let previous = slot.compare_and_swap(&None::<Arc<T>>, Some(Arc::clone(&candidate)));
    match &*previous {
        None => candidate,
        Some(winner) => {
            debug!("Lost the client creation race; discarding the new client.");
            Arc::clone(winner)
        }
    }
}
