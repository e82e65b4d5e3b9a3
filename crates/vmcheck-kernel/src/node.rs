//! Fleet members as the kernel sees them.
//!
//! A node is a cluster member; its backing VM carries the property bag.
//! Both are read-only snapshots produced by whatever lists the fleet.

use crate::property::PropertyBag;
use serde::{Deserialize, Serialize};

/// A cluster node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The virtual machine backing a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extra_config: PropertyBag,
}

impl VirtualMachine {
    pub fn new(name: impl Into<String>, extra_config: PropertyBag) -> Self {
        Self {
            name: name.into(),
            extra_config,
        }
    }
}

/// One node with its VM, if the VM could be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node: Node,
    #[serde(default)]
    pub vm: Option<VirtualMachine>,
}

impl NodeRecord {
    pub fn new(node: Node, vm: Option<VirtualMachine>) -> Self {
        Self { node, vm }
    }
}
