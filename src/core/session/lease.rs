// src/core/session/lease.rs

//! Defines `ClientLease`, an RAII owner for a client held in the active slot.

use crate::core::transport::{TransportClient, shutdown_quietly};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_LEASE_ID: AtomicU64 = AtomicU64::new(1);

/// Owns one transport client and shuts it down when the last handle is dropped.
///
/// The active slot and every in-flight request hold an `Arc<ClientLease<C>>`.
/// Retiring a client only drops the slot's handle, so a request that already
/// resolved the client finishes before the connection is closed.
pub struct ClientLease<C: TransportClient> {
    id: u64,
    client: C,
}

impl<C: TransportClient> ClientLease<C> {
    pub(crate) fn new(client: C) -> Self {
        Self {
            id: NEXT_LEASE_ID.fetch_add(1, Ordering::Relaxed),
            client,
        }
    }

    /// A process-unique identifier, useful for correlating log lines.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: TransportClient> Drop for ClientLease<C> {
    fn drop(&mut self) {
        debug!("Shutting down transport client (lease {}).", self.id);
        shutdown_quietly(&self.client);
    }
}
