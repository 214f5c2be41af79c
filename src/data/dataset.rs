//! Labeled dataset container.

use crate::data::CscMatrix;
use crate::error::DataError;

/// Value of [`Dataset::bias`] that disables the bias feature.
pub const NO_BIAS: f64 = -1.0;

/// A labeled training set over sparse features.
///
/// Column `j` of the feature matrix is the feature vector of sample `j`.
/// When a bias feature is enabled (`bias >= 0`), the caller has appended it
/// as the *last row* of every column, and `dimension` already counts it.
///
/// Derived quantities are not stored: `n_samples == x.n_cols()`,
/// `dimension == x.n_rows()`, `n_classes == labels.len()`.
///
/// Training mutates the dataset in place exactly once per call: the label
/// order may be swapped for signed binary labels, the sample columns are
/// permuted to group classes contiguously, and `y` is relabeled to +/-1 for
/// the binary subproblem. Membership of every `y` value in `labels` is *not*
/// checked at construction; it is verified during training preprocessing,
/// which reports a violation as a distinct error.
#[derive(Debug, Clone)]
pub struct Dataset {
    y: Vec<f64>,
    labels: Vec<f64>,
    x: CscMatrix,
    bias: f64,
}

impl Dataset {
    /// Create a dataset from a feature matrix, targets, and the set of
    /// distinct labels.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if `y` does not have one entry per column of `x`
    /// or the label set is empty.
    pub fn new(x: CscMatrix, y: Vec<f64>, labels: Vec<f64>, bias: f64) -> Result<Self, DataError> {
        if y.len() != x.n_cols() {
            return Err(DataError::ShapeMismatch {
                context: "targets",
                expected: x.n_cols(),
                actual: y.len(),
            });
        }
        if labels.is_empty() {
            return Err(DataError::Empty("label set"));
        }
        Ok(Self { y, labels, x, bias })
    }

    /// Number of training samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.x.n_cols()
    }

    /// Feature dimension, including the bias row when enabled.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.x.n_rows()
    }

    /// Number of distinct classes.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Target value per sample.
    #[inline]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Distinct target values.
    #[inline]
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// The sparse feature matrix.
    #[inline]
    pub fn x(&self) -> &CscMatrix {
        &self.x
    }

    /// Bias feature value, or [`NO_BIAS`] when disabled.
    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Whether a bias feature row is present.
    #[inline]
    pub fn has_bias(&self) -> bool {
        self.bias >= 0.0
    }

    /// Swap two labels in the label set.
    pub(crate) fn swap_labels(&mut self, a: usize, b: usize) {
        self.labels.swap(a, b);
    }

    /// Reorder sample columns so that new column `k` is old column `perm[k]`.
    pub(crate) fn permute_samples(&mut self, perm: &[usize]) {
        self.x.permute_cols(perm);
    }

    /// Overwrite targets for the binary subproblem: the first `pos_count`
    /// (permuted) samples become +1, the remainder -1.
    pub(crate) fn relabel_binary(&mut self, pos_count: usize) {
        debug_assert!(pos_count <= self.y.len());
        for (i, y) in self.y.iter_mut().enumerate() {
            *y = if i < pos_count { 1.0 } else { -1.0 };
        }
    }
}
