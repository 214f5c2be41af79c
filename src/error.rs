//! Error types for data validation and training.

use thiserror::Error;

/// Errors raised while constructing or validating data containers.
#[derive(Debug, Error)]
pub enum DataError {
    /// The container has no columns, no rows, or no labels.
    #[error("empty data: {0}")]
    Empty(&'static str),

    /// A buffer length does not match the declared shape.
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Row indices within a sparse column must be strictly increasing.
    #[error("row indices of sparse column {col} are not strictly increasing")]
    UnsortedIndices { col: usize },

    /// A sparse entry points outside the matrix.
    #[error("row index {row} in sparse column {col} is out of bounds for {n_rows} rows")]
    IndexOutOfBounds {
        col: usize,
        row: usize,
        n_rows: usize,
    },

    /// Column pointers must be monotonically non-decreasing.
    #[error("column pointer array is not monotone at column {col}")]
    InvalidColumnPointers { col: usize },
}

/// Errors raised by a training call.
///
/// Degenerate L-BFGS curvature (`y_k . s_k == 0`) is deliberately *not* an
/// error: the solver substitutes a safe pair and continues with a warning.
#[derive(Debug, Error)]
pub enum TrainError {
    /// A hyperparameter failed validation before training started.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The dataset failed structural validation.
    #[error("invalid dataset: {0}")]
    InvalidDataset(#[from] DataError),

    /// Preprocessing failed: a sample carries a label that is not in the
    /// dataset's label set. Distinct from argument validation so callers can
    /// tell data corruption apart from misconfiguration.
    #[error("preprocessing failed: label {label} of sample {sample} not found in label set")]
    LabelMismatch { sample: usize, label: f64 },

    /// The line search was handed a direction that does not descend.
    /// This indicates a bug in gradient or direction construction upstream,
    /// so the solve is aborted rather than patched over.
    #[error("line search requires a descent direction (grad . p = {directional:e})")]
    NonDescentDirection { directional: f64 },

    /// Backtracking failed to satisfy the sufficient-decrease condition
    /// within the step budget.
    #[error("line search exhausted after {steps} backtracking steps")]
    LineSearchFailed { steps: usize },

    /// Training is implemented for binary problems only.
    #[error("only binary classification is supported (dataset has {n_classes} classes)")]
    UnsupportedClassCount { n_classes: usize },
}
