//! The pluggable check interface.
//!
//! A driver lists the fleet once per cycle and calls every registered
//! check in three phases: `start_check`, then `check_node` once per node,
//! then `finish_check`. Checks keep their cycle-scoped counts in the shared
//! [`CheckContext`] so that a pipeline of checks can share one context.

use crate::aggregate::CycleAggregator;
use crate::error::CheckError;
use crate::node::{Node, VirtualMachine};
use crate::reporter::CycleReport;
use std::collections::BTreeMap;

/// A per-node check run once per cycle.
pub trait NodeCheck: Send {
    /// Name of this check (for diagnostics and aggregation keys).
    fn name(&self) -> &str;

    /// Open a cycle.
    fn start_check(&mut self, ctx: &mut CheckContext) -> Result<(), CheckError>;

    /// Inspect one node and its backing VM.
    ///
    /// An error concerns this node only; the driver logs it and moves on.
    fn check_node(
        &mut self,
        ctx: &mut CheckContext,
        node: &Node,
        vm: &VirtualMachine,
    ) -> Result<(), CheckError>;

    /// Close the cycle and emit its metrics.
    fn finish_check(&mut self, ctx: &mut CheckContext) -> Result<CycleReport, CheckError>;
}

/// Cycle-scoped aggregation state, keyed by check name.
#[derive(Debug, Clone, Default)]
pub struct ClusterInfo {
    aggregators: BTreeMap<String, CycleAggregator>,
}

impl ClusterInfo {
    /// Aggregator for `check`, created on first use.
    pub fn aggregator_entry(&mut self, check: &str) -> &mut CycleAggregator {
        self.aggregators.entry(check.to_string()).or_default()
    }

    /// Aggregator for `check`, which must already exist.
    pub fn aggregator_mut(&mut self, check: &str) -> Result<&mut CycleAggregator, CheckError> {
        self.aggregators
            .get_mut(check)
            .ok_or_else(|| CheckError::UnknownCheck(check.to_string()))
    }

    pub fn aggregator(&self, check: &str) -> Option<&CycleAggregator> {
        self.aggregators.get(check)
    }
}

/// Context handed to every check callback.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    pub cluster_info: ClusterInfo,
}

impl CheckContext {
    pub fn new() -> Self {
        Self::default()
    }
}
