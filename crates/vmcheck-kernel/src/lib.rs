//! # vmcheck Kernel
//!
//! Fleet-wide consistency checks over a VM configuration property, reported
//! as gauges that never leave a stale label behind.
//!
//! Each cycle a driver lists the fleet and calls every check three times
//! over: once to open the cycle, once per node, once to close it. Counts
//! live for one cycle; the only state that outlives a cycle is which gauge
//! labels were emitted, so that labels which disappear get an explicit zero.
//!
//! ## Architecture
//!
//! ```text
//! PropertyBag           ← extraConfig of one VM
//!     │ classify
//! Classification        ← ENABLED | DISABLED
//!     │ record
//! CycleAggregator       ← counts for this cycle, in CheckContext
//!     │ complete
//! Reporter              ← MISMATCH + counts + stale zeroes
//!     │
//! MetricSink            ← gauge vector with one label dimension
//! ```

pub mod aggregate;
pub mod cbt;
pub mod check;
pub mod config;
pub mod error;
pub mod node;
pub mod property;
pub mod reporter;
pub mod runner;
pub mod sink;
pub mod stale;

pub use aggregate::{CycleAggregator, CycleCounts, CycleState};
pub use cbt::{CBT_CHECK_NAME, CbtCheck, check_name_for};
pub use check::{CheckContext, ClusterInfo, NodeCheck};
pub use config::{
    CBT_METRIC_HELP, CBT_METRIC_NAME, CBT_MISMATCH_LABEL, CBT_PROPERTY, CheckConfig,
};
pub use error::{CheckError, SinkError};
pub use node::{Node, NodeRecord, VirtualMachine};
pub use property::{Classification, OptionValue, PropertyBag, classify};
pub use reporter::{CycleReport, Reporter, SinkFailure};
pub use runner::{CheckFailure, CheckRunner, CycleOutcome};
pub use sink::{MISMATCH_LABEL, MetricSink, RecordingSink};
pub use stale::StaleLabelTracker;
