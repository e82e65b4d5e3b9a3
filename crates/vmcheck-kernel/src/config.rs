//! Check configuration.

use serde::{Deserialize, Serialize};

/// VM extraConfig key holding the changed-block-tracking flag.
pub const CBT_PROPERTY: &str = "ctkEnabled";
/// Name of the gauge vector.
pub const CBT_METRIC_NAME: &str = "vsphere_vm_cbt_checks";
/// Help text of the gauge vector.
pub const CBT_METRIC_HELP: &str = "Boolean metric based on whether ctkEnabled is consistent or not across all nodes in the cluster.";
/// Single label dimension of the gauge vector.
pub const CBT_MISMATCH_LABEL: &str = "cbt";

/// Settings for one property check and the gauge it reports to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Property key looked up in each VM's extraConfig.
    pub property_key: String,
    pub metric_name: String,
    pub metric_help: String,
    /// Label dimension name of the gauge vector.
    pub label_name: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            property_key: CBT_PROPERTY.to_string(),
            metric_name: CBT_METRIC_NAME.to_string(),
            metric_help: CBT_METRIC_HELP.to_string(),
            label_name: CBT_MISMATCH_LABEL.to_string(),
        }
    }
}
