//! Convex problem formulations: regularizers and the logistic loss.
//!
//! Naming follows the math: `w` is the weight vector, `X` the feature
//! matrix (one column per sample), `z = w^T X` the per-sample margins, and
//! `C` the per-sample penalty weights.

use ndarray::Array1;
use rayon::prelude::*;

use crate::data::Dataset;

// =============================================================================
// Penalty (regularizer)
// =============================================================================

/// Regularization penalty added to the logistic loss.
///
/// Both variants are stateless functions of the weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Penalty {
    /// `||w||_1`, sparsity-inducing; optimized orthant-wise.
    L1,
    /// `0.5 * ||w||^2`, smooth shrinkage.
    #[default]
    L2,
}

impl Penalty {
    /// Penalty term of the loss.
    pub fn loss(&self, w: &Array1<f64>) -> f64 {
        match self {
            Penalty::L1 => w.iter().map(|v| v.abs()).sum(),
            Penalty::L2 => 0.5 * w.dot(w),
        }
    }

    /// Add this penalty's gradient contribution to `grad` in place.
    ///
    /// For L2 this is simply `grad += w`. For L1 it is the orthant-wise
    /// pseudo-gradient of Andrew & Gao (2007): at a zero coordinate the raw
    /// gradient is clipped toward zero by at most one unit, which yields a
    /// valid sub-gradient without leaving the current orthant.
    pub fn apply(&self, w: &Array1<f64>, grad: &mut Array1<f64>) {
        debug_assert_eq!(w.len(), grad.len());
        match self {
            Penalty::L2 => {
                *grad += w;
            }
            Penalty::L1 => {
                for (g, &wi) in grad.iter_mut().zip(w.iter()) {
                    if wi == 0.0 {
                        if *g < -1.0 {
                            *g += 1.0;
                        } else if *g > 1.0 {
                            *g -= 1.0;
                        } else {
                            *g = 0.0;
                        }
                    } else {
                        *g += if wi > 0.0 { 1.0 } else { -1.0 };
                    }
                }
            }
        }
    }
}

// =============================================================================
// Problem
// =============================================================================

/// A convex minimization problem over a weight vector.
///
/// The solver drives a problem exclusively through these four operations.
///
/// Contract between `loss` and `gradient`: `gradient(w, ..)` reuses the
/// per-sample margins computed by the *immediately preceding* `loss(w)` call
/// at the same `w` (the `z = w^T X` product is computed once and shared).
/// Solvers uphold this by always evaluating the loss at a point before
/// asking for its gradient.
pub trait Problem {
    /// Length of the weight vector.
    fn dimension(&self) -> usize;

    /// Which penalty this problem carries.
    fn penalty(&self) -> Penalty;

    /// Regularized loss at `w`.
    fn loss(&mut self, w: &Array1<f64>) -> f64;

    /// Gradient at `w`, written into `grad`.
    ///
    /// The L2 variant folds the penalty term (`+ w`) into this gradient; the
    /// L1 variant leaves the smooth logistic part only and defers orthant
    /// handling to [`Problem::regularized_gradient`].
    fn gradient(&mut self, w: &Array1<f64>, grad: &mut Array1<f64>);

    /// Apply the penalty's (pseudo-)gradient contribution to `grad`.
    fn regularized_gradient(&self, w: &Array1<f64>, grad: &mut Array1<f64>);

    /// Step update `next_w = w + alpha * p`, with any feasibility projection
    /// the variant requires.
    fn update_weights(&self, next_w: &mut Array1<f64>, w: &Array1<f64>, p: &Array1<f64>, alpha: f64);
}

/// Binary logistic-loss problem over a prepared dataset.
///
/// Expects targets already relabeled to +/-1 and one penalty weight per
/// sample. Borrows the dataset for the duration of one solve.
pub struct LogisticProblem<'a> {
    dataset: &'a Dataset,
    c: Vec<f64>,
    penalty: Penalty,
    /// Margin scratch: holds `z = w^T X` after `loss`, consumed by `gradient`.
    z: Vec<f64>,
}

impl<'a> LogisticProblem<'a> {
    /// Bind a prepared dataset and per-sample penalties to a penalty variant.
    ///
    /// # Panics
    ///
    /// Debug-asserts `c.len() == dataset.n_samples()`.
    pub fn new(dataset: &'a Dataset, c: Vec<f64>, penalty: Penalty) -> Self {
        debug_assert_eq!(c.len(), dataset.n_samples());
        let n_samples = dataset.n_samples();
        Self {
            dataset,
            c,
            penalty,
            z: vec![0.0; n_samples],
        }
    }
}

/// `ln(1 + exp(t))` without overflow for large `t`.
#[inline]
fn log1p_exp(t: f64) -> f64 {
    if t > 0.0 {
        t + (-t).exp().ln_1p()
    } else {
        t.exp().ln_1p()
    }
}

impl Problem for LogisticProblem<'_> {
    #[inline]
    fn dimension(&self) -> usize {
        self.dataset.dimension()
    }

    #[inline]
    fn penalty(&self) -> Penalty {
        self.penalty
    }

    fn loss(&mut self, w: &Array1<f64>) -> f64 {
        let ws = w.as_slice().expect("weight vector is contiguous");
        let x = self.dataset.x();
        // z = w^T X: one independent dot product per sample column
        self.z
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, zi)| *zi = x.dot_col(i, ws));

        let y = self.dataset.y();
        let data_loss: f64 = self
            .z
            .iter()
            .zip(y)
            .zip(&self.c)
            .map(|((&zi, &yi), &ci)| ci * log1p_exp(-yi * zi))
            .sum();
        self.penalty.loss(w) + data_loss
    }

    fn gradient(&mut self, w: &Array1<f64>, grad: &mut Array1<f64>) {
        debug_assert_eq!(grad.len(), self.dimension());
        let y = self.dataset.y();
        // overwrite the margins with the per-sample gradient scale
        // C_i * (sigma(y_i z_i) - 1) * y_i
        for ((zi, &yi), &ci) in self.z.iter_mut().zip(y).zip(&self.c) {
            let sig = 1.0 / (1.0 + (-yi * *zi).exp());
            *zi = ci * (sig - 1.0) * yi;
        }
        grad.fill(0.0);
        let gs = grad.as_slice_mut().expect("gradient vector is contiguous");
        self.dataset.x().scaled_scatter(&self.z, gs);
        if self.penalty == Penalty::L2 {
            *grad += w;
        }
    }

    fn regularized_gradient(&self, w: &Array1<f64>, grad: &mut Array1<f64>) {
        self.penalty.apply(w, grad);
    }

    fn update_weights(&self, next_w: &mut Array1<f64>, w: &Array1<f64>, p: &Array1<f64>, alpha: f64) {
        debug_assert_eq!(next_w.len(), w.len());
        for ((next, &wi), &pi) in next_w.iter_mut().zip(w.iter()).zip(p.iter()) {
            *next = wi + alpha * pi;
        }
        if self.penalty == Penalty::L1 {
            // a coordinate may not cross zero within one step
            for (next, &wi) in next_w.iter_mut().zip(w.iter()) {
                if *next * wi < 0.0 {
                    *next = 0.0;
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
