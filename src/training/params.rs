//! Training hyperparameters.

use crate::error::TrainError;
use crate::training::logger::Verbosity;
use crate::training::problem::Penalty;

/// Solver used to minimize the regularized loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// Fixed-step gradient descent.
    GradientDescent,
    /// Limited-memory BFGS with backtracking line search.
    #[default]
    Lbfgs,
}

/// Parameters for one training call.
///
/// # Example
///
/// ```
/// use sparselin::training::{Parameter, Penalty, SolverKind};
///
/// let params = Parameter {
///     penalty: Penalty::L1,
///     max_epoch: 200,
///     ..Default::default()
/// };
/// assert_eq!(params.solver, SolverKind::Lbfgs);
/// ```
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Which solver drives the optimization.
    pub solver: SolverKind,

    /// Which regularizer the problem carries.
    pub penalty: Penalty,

    /// Stop when the relative loss improvement between epochs drops below
    /// this threshold.
    pub rela_tol: f64,

    /// Stop when the loss itself drops below this threshold.
    pub abs_tol: f64,

    /// Hard cap on epochs.
    pub max_epoch: usize,

    /// Step size for [`SolverKind::GradientDescent`]; ignored by L-BFGS.
    pub learning_rate: f64,

    /// Default per-sample penalty weight.
    pub base_c: f64,

    /// Multiplicative penalty overrides as `(label, multiplier)` pairs.
    /// Samples of `label` get `base_c * multiplier`. Labels not present in
    /// the dataset are ignored with a warning.
    pub adjust_c: Vec<(f64, f64)>,

    /// L-BFGS curvature history window.
    pub m_step: usize,

    /// Verbosity of training output.
    pub verbosity: Verbosity,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            solver: SolverKind::default(),
            penalty: Penalty::default(),
            rela_tol: 1e-6,
            abs_tol: 1e-9,
            max_epoch: 100,
            learning_rate: 0.01,
            base_c: 1.0,
            adjust_c: Vec::new(),
            m_step: 10,
            verbosity: Verbosity::default(),
        }
    }
}

impl Parameter {
    /// Check that the numeric fields make sense before training starts.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::InvalidParameter`] naming the offending field.
    pub fn validate(&self) -> Result<(), TrainError> {
        if !(self.rela_tol > 0.0) {
            return Err(TrainError::InvalidParameter(format!(
                "rela_tol must be positive, got {}",
                self.rela_tol
            )));
        }
        if !(self.abs_tol > 0.0) {
            return Err(TrainError::InvalidParameter(format!(
                "abs_tol must be positive, got {}",
                self.abs_tol
            )));
        }
        if self.max_epoch == 0 {
            return Err(TrainError::InvalidParameter(
                "max_epoch must be at least 1".to_string(),
            ));
        }
        if self.solver == SolverKind::GradientDescent && !(self.learning_rate > 0.0) {
            return Err(TrainError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.base_c > 0.0) {
            return Err(TrainError::InvalidParameter(format!(
                "base_c must be positive, got {}",
                self.base_c
            )));
        }
        if self.m_step == 0 {
            return Err(TrainError::InvalidParameter(
                "m_step must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
