//! Outbound metric surface.
//!
//! The kernel only ever sets labeled gauge values. Where those values go
//! (a Prometheus registry, a test recorder) is decided at wiring time.

use crate::error::SinkError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Label value of the mismatch indicator.
pub const MISMATCH_LABEL: &str = "MISMATCH";

/// A gauge vector keyed by a single label dimension.
pub trait MetricSink: Send {
    /// Set the gauge for `label` to `value`.
    fn set_labeled_value(&self, label: &str, value: f64) -> Result<(), SinkError>;
}

/// In-memory sink that records every call.
///
/// Clones share the same recording, so a test can keep one handle while
/// the reporter owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recording>>,
}

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<(String, f64)>,
    values: BTreeMap<String, f64>,
    rejected: BTreeSet<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future update of `label` fail.
    pub fn reject(&self, label: impl Into<String>) {
        self.lock().rejected.insert(label.into());
    }

    /// Every accepted call in order.
    pub fn calls(&self) -> Vec<(String, f64)> {
        self.lock().calls.clone()
    }

    pub fn value(&self, label: &str) -> Option<f64> {
        self.lock().values.get(label).copied()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MetricSink for RecordingSink {
    fn set_labeled_value(&self, label: &str, value: f64) -> Result<(), SinkError> {
        let mut rec = self.lock();
        if rec.rejected.contains(label) {
            return Err(SinkError::Rejected {
                label: label.to_string(),
                reason: "label rejected by recording sink".to_string(),
            });
        }
        rec.calls.push((label.to_string(), value));
        rec.values.insert(label.to_string(), value);
        Ok(())
    }
}
