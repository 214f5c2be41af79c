//! Trained model record.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// A trained linear classifier.
///
/// Weights are stored as an `Array2<f64>` with shape `[dimension, n_ws]`
/// where `n_ws == 1` for binary classification (a single weight column) and
/// `n_ws == n_classes` otherwise:
///
/// ```text
/// weights[[feature, col]] -> coefficient
/// ```
///
/// When the dataset carried a bias feature, `bias_values[col]` caches
/// `bias * weights[[dimension - 1, col]]` so prediction adds one scalar per
/// column instead of re-reading the bias row.
///
/// A model has exactly one owner at a time: the trainer hands it out by
/// value and forgets it, and prediction takes `&self`. There is no shared
/// handle and no lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    n_classes: usize,
    dimension: usize,
    bias: f64,
    labels: Vec<f64>,
    weights: Array2<f64>,
    bias_values: Option<Vec<f64>>,
}

impl Model {
    /// Number of weight columns for a given class count.
    #[inline]
    pub fn n_ws_for(n_classes: usize) -> usize {
        if n_classes == 2 {
            1
        } else {
            n_classes
        }
    }

    /// Reassemble a model from previously exported parts.
    ///
    /// This is the re-loading half of the export round trip: the weight
    /// buffer is row-major `[dimension, n_ws]`, exactly what
    /// [`Model::weights_flat`] produced.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the label set, weight buffer, or bias values
    /// disagree with the declared shape.
    pub fn from_parts(
        n_classes: usize,
        dimension: usize,
        bias: f64,
        labels: Vec<f64>,
        weights: Vec<f64>,
        bias_values: Option<Vec<f64>>,
    ) -> Result<Self, DataError> {
        if labels.len() != n_classes {
            return Err(DataError::ShapeMismatch {
                context: "model labels",
                expected: n_classes,
                actual: labels.len(),
            });
        }
        let n_ws = Self::n_ws_for(n_classes);
        if weights.len() != dimension * n_ws {
            return Err(DataError::ShapeMismatch {
                context: "model weights",
                expected: dimension * n_ws,
                actual: weights.len(),
            });
        }
        if let Some(ref bv) = bias_values {
            if bv.len() != n_ws {
                return Err(DataError::ShapeMismatch {
                    context: "model bias values",
                    expected: n_ws,
                    actual: bv.len(),
                });
            }
        }
        let weight_len = weights.len();
        let weights = Array2::from_shape_vec((dimension, n_ws), weights)
            .map_err(|_| DataError::ShapeMismatch {
                context: "model weight matrix",
                expected: dimension * n_ws,
                actual: weight_len,
            })?;
        Ok(Self {
            n_classes,
            dimension,
            bias,
            labels,
            weights,
            bias_values,
        })
    }

    /// Construct a model directly from training output.
    ///
    /// Shapes are the trainer's responsibility; they are debug-asserted only.
    pub(crate) fn from_training(
        n_classes: usize,
        bias: f64,
        labels: Vec<f64>,
        weights: Array2<f64>,
        bias_values: Option<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(labels.len(), n_classes);
        debug_assert_eq!(weights.ncols(), Self::n_ws_for(n_classes));
        let dimension = weights.nrows();
        Self {
            n_classes,
            dimension,
            bias,
            labels,
            weights,
            bias_values,
        }
    }

    /// Number of classes.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Feature dimension (bias row included when enabled).
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Bias feature value; negative when disabled.
    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Class labels, in decision order.
    #[inline]
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Number of weight columns (1 for binary models).
    #[inline]
    pub fn n_ws(&self) -> usize {
        self.weights.ncols()
    }

    /// Weight of `feature` in column `col`.
    #[inline]
    pub fn weight(&self, feature: usize, col: usize) -> f64 {
        self.weights[[feature, col]]
    }

    /// Precomputed `bias * weights[dimension - 1][col]` per column, when the
    /// bias feature is enabled.
    #[inline]
    pub fn bias_values(&self) -> Option<&[f64]> {
        self.bias_values.as_deref()
    }

    /// The weight buffer, flattened row-major (feature-major, column-minor).
    ///
    /// Suitable for [`Model::from_parts`] and external serialization.
    pub fn weights_flat(&self) -> Vec<f64> {
        self.weights.iter().copied().collect()
    }
}
