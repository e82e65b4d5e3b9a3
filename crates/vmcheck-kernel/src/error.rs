//! Error types for vmcheck kernel operations.

use crate::aggregate::CycleState;

/// Errors arising from a checker's per-node or per-cycle callbacks.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// A property value could not be interpreted.
    ///
    /// Boolean properties never produce this: absence and unparseable
    /// values both classify as disabled. It exists for properties whose
    /// values must parse before they can be counted.
    #[error("cannot classify property `{key}` with value `{value}`")]
    Classification { key: String, value: String },

    /// The driver called a lifecycle method out of order.
    #[error("lifecycle violation in {operation}: expected {expected}, found {actual}")]
    LifecycleViolation {
        operation: &'static str,
        expected: CycleState,
        actual: CycleState,
    },

    /// The context holds no aggregation slot for this check.
    #[error("no aggregation state registered for check `{0}`")]
    UnknownCheck(String),
}

/// Errors from a metric sink.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The backend refused the labeled update.
    #[error("sink rejected label `{label}`: {reason}")]
    Rejected { label: String, reason: String },
}
