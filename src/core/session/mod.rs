// src/core/session/mod.rs

//! Implements `SessionedClient`, which forces a full reconnect at a regular
//! interval (a session) so a long-lived process never sticks to one server
//! instance forever. When the cluster topology changes, fresh clients spread
//! load across the new set of servers.

pub mod clock;
pub mod lease;

use crate::config::SessionConfig;
use crate::core::errors::Result;
use crate::core::metrics::{NoopSessionMetrics, SessionGauge, SessionMetrics};
use crate::core::transport::{
    ClientFactory, RequestExecutor, TransportClient, get_or_set_another_client,
};
use arc_swap::ArcSwapOption;
use clock::SessionClock;
use lease::ClientLease;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// A client wrapper that replaces its underlying client once per session.
///
/// The hot path is lock-free. The active client lives in an atomic slot and the
/// session boundary is claimed through a compare-and-exchange on the reconnect
/// timestamp, so exactly one of several racing callers retires the old client.
pub struct SessionedClient<F: ClientFactory> {
    name: Arc<str>,
    factory: F,
    session_duration: Duration,
    clock: Arc<SessionClock>,
    active: ArcSwapOption<ClientLease<F::Client>>,
    metrics: Arc<dyn SessionMetrics>,
    metrics_registered: AtomicBool,
}

impl<F: ClientFactory> SessionedClient<F> {
    /// Creates a sessioned client with no metrics reporting.
    pub fn new(name: impl Into<Arc<str>>, factory: F, session_duration: Duration) -> Self {
        Self::with_metrics(name, factory, session_duration, Arc::new(NoopSessionMetrics))
    }

    /// Creates a sessioned client and registers its session gauge with `metrics`.
    pub fn with_metrics(
        name: impl Into<Arc<str>>,
        factory: F,
        session_duration: Duration,
        metrics: Arc<dyn SessionMetrics>,
    ) -> Self {
        let name = name.into();
        let clock = Arc::new(SessionClock::new());
        metrics.register(SessionGauge::new(Arc::clone(&name), Arc::clone(&clock)));

        Self {
            name,
            factory,
            session_duration,
            clock,
            active: ArcSwapOption::empty(),
            metrics,
            metrics_registered: AtomicBool::new(true),
        }
    }

    pub fn from_config(
        factory: F,
        config: &SessionConfig,
        metrics: Arc<dyn SessionMetrics>,
    ) -> Self {
        Self::with_metrics(
            config.name.as_str(),
            factory,
            config.session_duration,
            metrics,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_duration(&self) -> Duration {
        self.session_duration
    }

    /// Runs `executor` against the client of the current session.
    ///
    /// Factory failures are returned for this call only and leave the slot empty,
    /// so the next call tries again. The executor's result is returned unchanged;
    /// a failed request does not evict its client.
    pub async fn execute<E>(&self, executor: E) -> Result<E::Response>
    where
        E: RequestExecutor<F::Client>,
    {
        // Only the client seen before the boundary is stale. One installed by
        // another caller after the boundary belongs to the new session.
        let stale = self.active.load_full();
        let now = Instant::now();
        if self.clock.try_rotate(now, self.session_duration) {
            self.retire_stale(&stale);
        }

        let lease = self.resolve_client().await?;
        executor.execute(lease.client()).await
    }

    /// Returns the active client, creating and installing one if the slot is empty.
    async fn resolve_client(&self) -> Result<Arc<ClientLease<F::Client>>> {
        if let Some(lease) = self.active.load_full() {
            return Ok(lease);
        }

        let candidate = self.factory.new_client().await?;
        Ok(self.install(Arc::new(ClientLease::new(candidate))))
    }

    /// Installs `candidate` unless another caller got there first, in which case
    /// the candidate is shut down and the winner returned.
    fn install(&self, candidate: Arc<ClientLease<F::Client>>) -> Arc<ClientLease<F::Client>> {
        let lease = get_or_set_another_client(&self.active, Arc::clone(&candidate));
        if Arc::ptr_eq(&lease, &candidate) {
            info!(
                "Sessioned client '{}' is now using transport client (lease {}).",
                self.name,
                lease.id()
            );
        }
        lease
    }

    /// Clears the slot only if it still holds `stale`, the client seen before
    /// the session boundary was claimed.
    fn retire_stale(&self, stale: &Option<Arc<ClientLease<F::Client>>>) {
        let Some(expected) = stale else {
            return;
        };
        let previous = self
            .active
            .compare_and_swap(stale, None::<Arc<ClientLease<F::Client>>>);
        if (*previous).as_ref().is_some_and(|p| Arc::ptr_eq(p, expected)) {
            debug!(
                "Sessioned client '{}' retiring transport client (lease {}): session expired.",
                self.name,
                expected.id()
            );
        }
    }

    /// Takes whatever client is in the slot out of it. The client shuts down
    /// once the last in-flight request holding it completes.
    fn retire_active(&self) {
        if let Some(lease) = self.active.swap(None) {
            debug!(
                "Sessioned client '{}' retiring transport client (lease {}): shutdown.",
                self.name,
                lease.id()
            );
        }
    }

    /// Releases the currently held client and unregisters from metrics.
    ///
    /// Safe to call more than once. A later `execute` creates a new client.
    pub fn shutdown(&self) {
        if self.metrics_registered.swap(false, Ordering::AcqRel) {
            self.metrics.unregister(&self.name);
        }
        self.retire_active();
    }

    /// Time since the last rotation, or zero if no rotation has happened yet.
    pub fn current_session_duration(&self) -> Duration {
        self.clock.elapsed()
    }

    /// A gauge handle observing this client's session age.
    pub fn session_gauge(&self) -> SessionGauge {
        SessionGauge::new(Arc::clone(&self.name), Arc::clone(&self.clock))
    }

    /// Whether a client currently occupies the active slot.
    pub fn has_active_client(&self) -> bool {
        self.active.load().is_some()
    }
}

impl<F: ClientFactory> Drop for SessionedClient<F> {
    fn drop(&mut self) {
        if self.metrics_registered.swap(false, Ordering::AcqRel) {
            self.metrics.unregister(&self.name);
        }
    }
}

// A sessioned client can itself be produced by an outer factory.
impl<F: ClientFactory> TransportClient for SessionedClient<F> {
    fn shutdown(&self) -> Result<()> {
        SessionedClient::shutdown(self);
        Ok(())
    }
}
