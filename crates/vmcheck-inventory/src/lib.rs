//! # vmcheck-inventory
//!
//! Fleet snapshots for the check runner.
//!
//! A snapshot is a JSONL file, one line per node with the VM that backs it:
//!
//! ```text
//! {"node":{"name":"worker-1"},"vm":{"name":"worker-1","extraConfig":[{"key":"ctkEnabled","value":"TRUE"}]}}
//! ```
//!
//! Each snapshot file stands for one listing of the fleet, so a sequence of
//! snapshots replays a sequence of cycles. Live vSphere and Kubernetes
//! listing are out of scope.

pub mod jsonl;

pub use jsonl::{FleetSnapshot, JsonlError, load_snapshots, read_records, read_records_from_path};
