// src/core/metrics.rs

//! Exposes the current session age of a sessioned client to a monitoring system.
//!
//! The sessioned client registers a [`SessionGauge`] with its [`SessionMetrics`] sink
//! on construction and unregisters by name on shutdown. One sink may serve many
//! clients. Sinks must never fail the client: any registration problem is logged
//! and swallowed.

use crate::config::SessionConfig;
use crate::core::errors::Result;
use crate::core::session::clock::SessionClock;
use parking_lot::Mutex;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Opts, Registry};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Suffix appended to the configured prefix to form the gauge name.
pub const SESSION_DURATION_METRIC: &str = "current_session_duration_milliseconds";

/// A read-only view of a sessioned client's session age, sampled on demand.
#[derive(Debug, Clone)]
pub struct SessionGauge {
    name: Arc<str>,
    clock: Arc<SessionClock>,
}

impl SessionGauge {
    pub(crate) fn new(name: Arc<str>, clock: Arc<SessionClock>) -> Self {
        Self { name, clock }
    }

    /// The name of the sessioned client this gauge observes.
    pub fn client_name(&self) -> &str {
        &self.name
    }

    pub fn current_session_duration(&self) -> Duration {
        self.clock.elapsed()
    }
}

/// A monitoring sink sessioned clients report to over their lifetime.
///
/// Registrations are keyed by client name, so `unregister` only removes the
/// gauge of the named client.
pub trait SessionMetrics: Send + Sync {
    fn register(&self, gauge: SessionGauge);
    fn unregister(&self, client_name: &str);
}

/// A sink that discards everything. Used when metrics are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionMetrics;

impl SessionMetrics for NoopSessionMetrics {
    fn register(&self, _gauge: SessionGauge) {}
    fn unregister(&self, _client_name: &str) {}
}

/// Samples the session clock every time the registry is gathered.
#[derive(Clone)]
struct SessionDurationCollector {
    gauge: Gauge,
    source: SessionGauge,
}

impl Collector for SessionDurationCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.gauge.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let millis = self.source.current_session_duration().as_nanos() as f64 / 1_000_000.0;
        self.gauge.set(millis);
        self.gauge.collect()
    }
}

/// Publishes the session age as a Prometheus gauge labelled with the client name.
pub struct PrometheusSessionMetrics {
    registry: Registry,
    prefix: String,
    registered: Mutex<HashMap<Arc<str>, SessionDurationCollector>>,
}

impl PrometheusSessionMetrics {
    pub fn new(registry: Registry, prefix: impl Into<String>) -> Self {
        Self {
            registry,
            prefix: prefix.into(),
            registered: Mutex::new(HashMap::new()),
        }
    }

    /// Builds the sink described by `config.metrics`, or a no-op sink when disabled.
    pub fn from_config(registry: Registry, config: &SessionConfig) -> Arc<dyn SessionMetrics> {
        if config.metrics.enabled {
            Arc::new(Self::new(registry, config.metrics.prefix.clone()))
        } else {
            Arc::new(NoopSessionMetrics)
        }
    }

    pub fn metric_name(&self) -> String {
        format!("{}_{}", self.prefix, SESSION_DURATION_METRIC)
    }

    fn try_register(&self, source: SessionGauge) -> Result<()> {
        let opts = Opts::new(self.metric_name(), "Duration of the current session")
            .const_label("client", source.client_name());
        let collector = SessionDurationCollector {
            gauge: Gauge::with_opts(opts)?,
            source,
        };
        let name = Arc::clone(&collector.source.name);
        self.registry.register(Box::new(collector.clone()))?;
        self.registered.lock().insert(name, collector);
        Ok(())
    }
}

impl SessionMetrics for PrometheusSessionMetrics {
    fn register(&self, gauge: SessionGauge) {
        let client = gauge.client_name().to_string();
        match self.try_register(gauge) {
            Ok(()) => debug!("Registered session metrics for client '{}'.", client),
            Err(e) => warn!(
                "Failed to register session metrics for client '{}': {}",
                client, e
            ),
        }
    }

    fn unregister(&self, client_name: &str) {
        let Some(collector) = self.registered.lock().remove(client_name) else {
            return;
        };
        match self.registry.unregister(Box::new(collector)) {
            Ok(()) => debug!("Unregistered session metrics for client '{}'.", client_name),
            Err(e) => warn!(
                "Failed to unregister session metrics for client '{}': {}",
                client_name, e
            ),
        }
    }
}
