//! Prometheus backing for vmcheck gauges.
//!
//! The gauge vector is registered once, into an explicitly constructed
//! [`Registry`], when the application is wired together. The resulting
//! [`GaugeVecSink`] is handed to a check's reporter and updated every cycle.
//!
//! | Metric | Type | Label | Values |
//! |--------|------|-------|--------|
//! | `vsphere_vm_cbt_checks` | Gauge | `cbt` | `MISMATCH`, `ENABLED`, `DISABLED` |

use prometheus::core::Collector;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;
use tracing::debug;
use vmcheck_kernel::{CheckConfig, MetricSink, SinkError};

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Failed to create or register a metric with Prometheus.
    #[error("failed to register metric: {0}")]
    RegistrationFailed(#[from] prometheus::Error),

    /// Failed to encode metrics output.
    #[error("failed to encode metrics: {0}")]
    EncodingFailed(String),
}

/// Result type for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// A single-label gauge vector used as a kernel metric sink.
///
/// Clones share the same underlying gauges.
#[derive(Clone)]
pub struct GaugeVecSink {
    gauge: GaugeVec,
}

impl GaugeVecSink {
    /// Creates the gauge vector described by `config` and registers it.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the name is already
    /// registered.
    pub fn register(registry: &Registry, config: &CheckConfig) -> MetricsResult<Self> {
        let gauge = GaugeVec::new(
            Opts::new(config.metric_name.as_str(), config.metric_help.as_str()),
            &[config.label_name.as_str()],
        )?;
        registry.register(Box::new(gauge.clone()))?;
        debug!(metric = %config.metric_name, label = %config.label_name, "registered gauge vector");
        Ok(Self { gauge })
    }

    /// Current value of `label`, if it has ever been set.
    ///
    /// Reads through a collect so that asking never creates the label.
    pub fn value(&self, label: &str) -> Option<f64> {
        self.gauge
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|metric| metric.get_label().iter().any(|pair| pair.get_value() == label))
            .map(|metric| metric.get_gauge().get_value())
    }
}

impl MetricSink for GaugeVecSink {
    fn set_labeled_value(&self, label: &str, value: f64) -> Result<(), SinkError> {
        let gauge = self
            .gauge
            .get_metric_with_label_values(&[label])
            .map_err(|e| SinkError::Rejected {
                label: label.to_string(),
                reason: e.to_string(),
            })?;
        gauge.set(value);
        Ok(())
    }
}

/// Registry that owns every vmcheck metric and exports them.
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    registry: Registry,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the gauge vector for one check.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails.
    pub fn register_check(&self, config: &CheckConfig) -> MetricsResult<GaugeVecSink> {
        GaugeVecSink::register(&self.registry, config)
    }

    /// Encodes all metrics in Prometheus text format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode_text(&self) -> MetricsResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::EncodingFailed(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingFailed(e.to_string()))
    }
}
