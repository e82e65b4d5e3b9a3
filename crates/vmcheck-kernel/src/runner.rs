//! Cycle driver over a set of checks.

use crate::check::{CheckContext, NodeCheck};
use crate::node::NodeRecord;
use crate::reporter::CycleReport;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A per-node or per-check failure that did not stop the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub check: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub error: String,
}

/// Everything one cycle produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub nodes_checked: usize,
    /// Nodes whose VM could not be resolved.
    pub nodes_skipped: Vec<String>,
    pub reports: Vec<CycleReport>,
    pub failures: Vec<CheckFailure>,
}

/// Runs registered checks over the fleet, one cycle at a time.
#[derive(Default)]
pub struct CheckRunner {
    checks: Vec<Box<dyn NodeCheck>>,
    ctx: CheckContext,
    cycle: u64,
}

impl CheckRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, check: Box<dyn NodeCheck>) {
        self.checks.push(check);
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Run one full cycle over `nodes`.
    ///
    /// A check whose `start_check` fails sits the cycle out. Node-level
    /// errors are recorded and the remaining nodes still run. Every started
    /// check is finished.
    pub fn run_cycle(&mut self, nodes: &[NodeRecord]) -> CycleOutcome {
        self.cycle += 1;
        let mut outcome = CycleOutcome {
            cycle: self.cycle,
            ..CycleOutcome::default()
        };

        let mut started = Vec::with_capacity(self.checks.len());
        for (idx, check) in self.checks.iter_mut().enumerate() {
            match check.start_check(&mut self.ctx) {
                Ok(()) => started.push(idx),
                Err(e) => {
                    warn!(check = check.name(), error = %e, "start_check failed");
                    outcome.failures.push(CheckFailure {
                        check: check.name().to_string(),
                        node: None,
                        error: e.to_string(),
                    });
                }
            }
        }

        for record in nodes {
            let Some(vm) = &record.vm else {
                warn!(node = %record.node.name, "no VM found for node, skipping");
                outcome.nodes_skipped.push(record.node.name.clone());
                continue;
            };
            outcome.nodes_checked += 1;
            for &idx in &started {
                let check = &mut self.checks[idx];
                debug!(check = check.name(), node = %record.node.name, "checking node");
                if let Err(e) = check.check_node(&mut self.ctx, &record.node, vm) {
                    warn!(check = check.name(), node = %record.node.name, error = %e, "check_node failed");
                    outcome.failures.push(CheckFailure {
                        check: check.name().to_string(),
                        node: Some(record.node.name.clone()),
                        error: e.to_string(),
                    });
                }
            }
        }

        for &idx in &started {
            let check = &mut self.checks[idx];
            match check.finish_check(&mut self.ctx) {
                Ok(report) => outcome.reports.push(report),
                Err(e) => {
                    warn!(check = check.name(), error = %e, "finish_check failed");
                    outcome.failures.push(CheckFailure {
                        check: check.name().to_string(),
                        node: None,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            cycle = outcome.cycle,
            nodes = outcome.nodes_checked,
            skipped = outcome.nodes_skipped.len(),
            failures = outcome.failures.len(),
            "cycle finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::node::{Node, VirtualMachine};

    /// Check that fails on one named node.
    struct Flaky {
        bad_node: &'static str,
    }

    impl NodeCheck for Flaky {
        fn name(&self) -> &str {
            "Flaky"
        }

        fn start_check(&mut self, _ctx: &mut CheckContext) -> Result<(), CheckError> {
            Ok(())
        }

        fn check_node(
            &mut self,
            _ctx: &mut CheckContext,
            node: &Node,
            _vm: &VirtualMachine,
        ) -> Result<(), CheckError> {
            if node.name == self.bad_node {
                return Err(CheckError::Classification {
                    key: "k".to_string(),
                    value: "v".to_string(),
                });
            }
            Ok(())
        }

        fn finish_check(&mut self, _ctx: &mut CheckContext) -> Result<CycleReport, CheckError> {
            Ok(CycleReport {
                check: "Flaky".to_string(),
                counts: Default::default(),
                mismatch: false,
                zeroed: Vec::new(),
                sink_failures: Vec::new(),
            })
        }
    }

    fn record(name: &str, with_vm: bool) -> NodeRecord {
        NodeRecord::new(Node::new(name), with_vm.then(VirtualMachine::default))
    }

    #[test]
    fn node_error_does_not_abort_cycle() {
        let mut runner = CheckRunner::new();
        runner.register(Box::new(Flaky { bad_node: "n2" }));

        let outcome = runner.run_cycle(&[record("n1", true), record("n2", true), record("n3", true)]);

        assert_eq!(outcome.nodes_checked, 3);
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].node.as_deref(), Some("n2"));
    }

    #[test]
    fn nodes_without_vm_are_skipped() {
        let mut runner = CheckRunner::new();
        runner.register(Box::new(Flaky { bad_node: "" }));

        let outcome = runner.run_cycle(&[record("n1", false), record("n2", true)]);

        assert_eq!(outcome.nodes_checked, 1);
        assert_eq!(outcome.nodes_skipped, vec!["n1".to_string()]);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn cycles_are_numbered() {
        let mut runner = CheckRunner::new();
        assert_eq!(runner.run_cycle(&[]).cycle, 1);
        assert_eq!(runner.run_cycle(&[]).cycle, 2);
        assert_eq!(runner.cycles(), 2);
    }
}
