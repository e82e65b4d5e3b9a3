//! Changed-block-tracking consistency check.
//!
//! Every VM in the cluster should agree on `ctkEnabled`. The check counts
//! ENABLED and DISABLED VMs per cycle and reports them, with a MISMATCH
//! flag when both are present.

use crate::check::{CheckContext, NodeCheck};
use crate::config::{CBT_PROPERTY, CheckConfig};
use crate::error::CheckError;
use crate::node::{Node, VirtualMachine};
use crate::property::{Classification, classify_value};
use crate::reporter::{CycleReport, Reporter};
use crate::sink::MetricSink;
use tracing::trace;

/// Name of the check on the default `ctkEnabled` property.
pub const CBT_CHECK_NAME: &str = "CollectNodeCBT";

/// Check name for `property_key`.
///
/// The default property keeps the bare name; any other key is appended so
/// that checks on different properties aggregate separately.
pub fn check_name_for(property_key: &str) -> String {
    if property_key == CBT_PROPERTY {
        CBT_CHECK_NAME.to_string()
    } else {
        format!("{CBT_CHECK_NAME}/{property_key}")
    }
}

/// Reports how consistently a VM property is set across the fleet.
#[derive(Debug)]
pub struct CbtCheck {
    name: String,
    property_key: String,
    reporter: Reporter,
}

impl CbtCheck {
    pub fn new(config: &CheckConfig, sink: Box<dyn MetricSink>) -> Self {
        let name = check_name_for(&config.property_key);
        Self {
            reporter: Reporter::new(name.clone(), sink),
            name,
            property_key: config.property_key.clone(),
        }
    }

    pub fn property_key(&self) -> &str {
        &self.property_key
    }

    /// Classify one VM, logging which branch was taken.
    pub fn classify(&self, node: &Node, vm: &VirtualMachine) -> Classification {
        match vm.extra_config.lookup(&self.property_key) {
            Some(entry) => {
                trace!(
                    node = %node.name,
                    property = %self.property_key,
                    value = %entry.rendered(),
                    "found property"
                );
                classify_value(entry)
            }
            None => {
                trace!(node = %node.name, property = %self.property_key, "property not found");
                Classification::Disabled
            }
        }
    }
}

impl NodeCheck for CbtCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_check(&mut self, ctx: &mut CheckContext) -> Result<(), CheckError> {
        ctx.cluster_info.aggregator_entry(&self.name).reset();
        Ok(())
    }

    fn check_node(
        &mut self,
        ctx: &mut CheckContext,
        node: &Node,
        vm: &VirtualMachine,
    ) -> Result<(), CheckError> {
        let classification = self.classify(node, vm);
        ctx.cluster_info
            .aggregator_mut(&self.name)?
            .record(classification)
    }

    fn finish_check(&mut self, ctx: &mut CheckContext) -> Result<CycleReport, CheckError> {
        let counts = ctx.cluster_info.aggregator_mut(&self.name)?.complete()?;
        Ok(self.reporter.report(&counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CycleState;
    use crate::property::{OptionValue, PropertyBag};
    use crate::sink::RecordingSink;

    fn vm(value: Option<&str>) -> VirtualMachine {
        let bag: PropertyBag = value
            .map(|v| OptionValue::new("ctkEnabled", v))
            .into_iter()
            .collect();
        VirtualMachine::new("vm", bag)
    }

    fn check() -> (CbtCheck, RecordingSink) {
        let sink = RecordingSink::new();
        (
            CbtCheck::new(&CheckConfig::default(), Box::new(sink.clone())),
            sink,
        )
    }

    #[test]
    fn records_into_shared_context() {
        let (mut check, _sink) = check();
        let mut ctx = CheckContext::new();
        check.start_check(&mut ctx).unwrap();
        check.check_node(&mut ctx, &Node::new("n1"), &vm(Some("TRUE"))).unwrap();
        check.check_node(&mut ctx, &Node::new("n2"), &vm(None)).unwrap();

        let counts = ctx.cluster_info.aggregator(CBT_CHECK_NAME).unwrap().snapshot();
        assert_eq!(counts.get(Classification::Enabled), 1);
        assert_eq!(counts.get(Classification::Disabled), 1);
    }

    #[test]
    fn check_node_without_start_is_an_error() {
        let (mut check, _sink) = check();
        let mut ctx = CheckContext::new();
        let err = check
            .check_node(&mut ctx, &Node::new("n1"), &vm(Some("true")))
            .unwrap_err();
        assert!(matches!(err, CheckError::UnknownCheck(_)));
    }

    #[test]
    fn finish_twice_is_an_error() {
        let (mut check, sink) = check();
        let mut ctx = CheckContext::new();
        check.start_check(&mut ctx).unwrap();
        check.finish_check(&mut ctx).unwrap();
        sink.clear_calls();

        let err = check.finish_check(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            CheckError::LifecycleViolation {
                actual: CycleState::Reported,
                ..
            }
        ));
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn custom_property_key_is_honoured() {
        let config = CheckConfig {
            property_key: "disk.EnableUUID".to_string(),
            ..CheckConfig::default()
        };
        let check = CbtCheck::new(&config, Box::new(RecordingSink::new()));
        let bag: PropertyBag = [OptionValue::new("disk.EnableUUID", "TRUE")]
            .into_iter()
            .collect();
        let vm = VirtualMachine::new("vm", bag);
        assert_eq!(check.property_key(), "disk.EnableUUID");
        assert_eq!(check.name(), "CollectNodeCBT/disk.EnableUUID");
        assert_eq!(check.classify(&Node::new("n"), &vm), Classification::Enabled);
    }
}
