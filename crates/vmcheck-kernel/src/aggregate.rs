//! Cycle-scoped aggregation of classifications.
//!
//! One aggregator lives for the whole process but its counts live for one
//! cycle only:
//!
//! ```text
//! Idle ──reset──▶ Accumulating ──record×N──▶ Accumulating ──complete──▶ Reported
//!                      ▲                                                   │
//!                      └────────────────────────reset──────────────────────┘
//! ```
//!
//! Recording outside `Accumulating`, or completing twice, is a caller
//! contract violation and is reported as [`CheckError::LifecycleViolation`].

use crate::error::CheckError;
use crate::property::Classification;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle position of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    Idle,
    Accumulating,
    Reported,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Accumulating => f.write_str("accumulating"),
            Self::Reported => f.write_str("reported"),
        }
    }
}

/// Count per classification for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCounts(BTreeMap<Classification, u64>);

impl CycleCounts {
    pub fn get(&self, c: Classification) -> u64 {
        self.0.get(&c).copied().unwrap_or(0)
    }

    /// Number of entities counted.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Classifications with a strictly positive count, in label order.
    pub fn positive(&self) -> impl Iterator<Item = (Classification, u64)> + '_ {
        self.0
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(c, count)| (*c, *count))
    }

    /// True iff at least two classifications have a positive count.
    pub fn is_mismatch(&self) -> bool {
        self.positive().nth(1).is_some()
    }

    fn increment(&mut self, c: Classification) {
        *self.0.entry(c).or_insert(0) += 1;
    }
}

impl FromIterator<(Classification, u64)> for CycleCounts {
    fn from_iter<I: IntoIterator<Item = (Classification, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Shared, mutable, cycle-scoped classification counts.
#[derive(Debug, Clone, Default)]
pub struct CycleAggregator {
    counts: CycleCounts,
    state: CycleState,
}

impl CycleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Clear all counts and open a new cycle.
    pub fn reset(&mut self) {
        self.counts = CycleCounts::default();
        self.state = CycleState::Accumulating;
    }

    /// Count one entity's classification.
    pub fn record(&mut self, c: Classification) -> Result<(), CheckError> {
        self.expect_state("record", CycleState::Accumulating)?;
        self.counts.increment(c);
        Ok(())
    }

    /// Current counts by value.
    pub fn snapshot(&self) -> CycleCounts {
        self.counts.clone()
    }

    /// Final snapshot of the cycle; closes it for further writes.
    pub fn complete(&mut self) -> Result<CycleCounts, CheckError> {
        self.expect_state("complete", CycleState::Accumulating)?;
        self.state = CycleState::Reported;
        Ok(self.snapshot())
    }

    fn expect_state(&self, operation: &'static str, expected: CycleState) -> Result<(), CheckError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CheckError::LifecycleViolation {
                operation,
                expected,
                actual: self.state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Classification::{Disabled, Enabled};

    #[test]
    fn counts_are_conserved() {
        let mut agg = CycleAggregator::new();
        agg.reset();
        let inputs = [Enabled, Disabled, Disabled, Enabled, Enabled];
        for c in inputs {
            agg.record(c).unwrap();
        }
        let counts = agg.snapshot();
        assert_eq!(counts.total(), inputs.len() as u64);
        assert_eq!(counts.get(Enabled), 3);
        assert_eq!(counts.get(Disabled), 2);
    }

    #[test]
    fn reset_clears_previous_cycle() {
        let mut agg = CycleAggregator::new();
        agg.reset();
        agg.record(Disabled).unwrap();
        agg.complete().unwrap();

        agg.reset();
        assert_eq!(agg.snapshot().total(), 0);
        assert_eq!(agg.state(), CycleState::Accumulating);
    }

    #[test]
    fn record_before_reset_is_rejected() {
        let mut agg = CycleAggregator::new();
        let err = agg.record(Enabled).unwrap_err();
        assert!(matches!(
            err,
            CheckError::LifecycleViolation {
                operation: "record",
                actual: CycleState::Idle,
                ..
            }
        ));
        assert_eq!(agg.snapshot().total(), 0);
    }

    #[test]
    fn record_after_complete_is_rejected() {
        let mut agg = CycleAggregator::new();
        agg.reset();
        agg.record(Enabled).unwrap();
        agg.complete().unwrap();
        assert!(agg.record(Enabled).is_err());
        assert_eq!(agg.snapshot().get(Enabled), 1);
    }

    #[test]
    fn complete_twice_is_rejected() {
        let mut agg = CycleAggregator::new();
        agg.reset();
        agg.complete().unwrap();
        let err = agg.complete().unwrap_err();
        assert!(err.to_string().contains("expected accumulating, found reported"));
    }

    #[test]
    fn mismatch_requires_two_positive_counts() {
        let uniform: CycleCounts = [(Enabled, 3), (Disabled, 0)].into_iter().collect();
        assert!(!uniform.is_mismatch());

        let mixed: CycleCounts = [(Enabled, 2), (Disabled, 1)].into_iter().collect();
        assert!(mixed.is_mismatch());

        assert!(!CycleCounts::default().is_mismatch());
    }
}
