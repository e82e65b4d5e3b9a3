//! End-of-cycle gauge reporting.
//!
//! The reporter turns a cycle's counts into gauge updates:
//!
//! 1. `MISMATCH` is set to 1 or 0 every cycle.
//! 2. Every classification with a positive count is set to that count.
//! 3. Every label emitted last cycle but absent now is set to 0.
//! 4. This cycle's labels are committed as the memory for the next one.
//!
//! Sink failures are logged and collected; they never stop the remaining
//! updates, since each label is correct or incorrect on its own.

use crate::aggregate::CycleCounts;
use crate::property::Classification;
use crate::sink::{MISMATCH_LABEL, MetricSink};
use crate::stale::StaleLabelTracker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Outcome of one report pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Check that produced the report.
    pub check: String,
    /// Positive counts keyed by label.
    pub counts: BTreeMap<String, u64>,
    pub mismatch: bool,
    /// Labels explicitly zeroed because they went stale this cycle.
    pub zeroed: Vec<String>,
    /// Updates the sink rejected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sink_failures: Vec<SinkFailure>,
}

impl CycleReport {
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// One rejected gauge update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkFailure {
    pub label: String,
    pub value: f64,
    pub reason: String,
}

/// Emits gauges for a cycle and zeroes labels that went stale.
pub struct Reporter {
    check: String,
    sink: Box<dyn MetricSink>,
    tracker: StaleLabelTracker<Classification>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("check", &self.check)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    pub fn new(check: impl Into<String>, sink: Box<dyn MetricSink>) -> Self {
        Self {
            check: check.into(),
            sink,
            tracker: StaleLabelTracker::new(),
        }
    }

    /// Whether `c` carried a value in the last reported cycle.
    pub fn was_emitted(&self, c: Classification) -> bool {
        self.tracker.is_emitted(&c)
    }

    /// Report one cycle's counts.
    pub fn report(&mut self, counts: &CycleCounts) -> CycleReport {
        let mut failures = Vec::new();

        let mismatch = counts.is_mismatch();
        debug!(
            check = %self.check,
            enabled = counts.get(Classification::Enabled),
            disabled = counts.get(Classification::Disabled),
            mismatch,
            "cycle counts"
        );
        self.set(MISMATCH_LABEL, if mismatch { 1.0 } else { 0.0 }, &mut failures);

        let mut reported = BTreeMap::new();
        for (c, count) in counts.positive() {
            debug!(check = %self.check, label = c.label(), count, "classification count");
            self.set(c.label(), count as f64, &mut failures);
            reported.insert(c.label().to_string(), count);
        }

        let stale = self.tracker.advance(counts.positive().map(|(c, _)| c));
        let mut zeroed = Vec::with_capacity(stale.len());
        for c in stale {
            debug!(check = %self.check, label = c.label(), "zeroing stale label");
            self.set(c.label(), 0.0, &mut failures);
            zeroed.push(c.label().to_string());
        }

        CycleReport {
            check: self.check.clone(),
            counts: reported,
            mismatch,
            zeroed,
            sink_failures: failures,
        }
    }

    fn set(&self, label: &str, value: f64, failures: &mut Vec<SinkFailure>) {
        if let Err(e) = self.sink.set_labeled_value(label, value) {
            warn!(check = %self.check, label, value, error = %e, "gauge update failed");
            failures.push(SinkFailure {
                label: label.to_string(),
                value,
                reason: e.to_string(),
            });
        }
    }
}
