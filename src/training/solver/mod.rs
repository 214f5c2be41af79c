//! Iterative solvers for regularized problems.

mod gd;
mod lbfgs;

pub use gd::GradientDescent;
pub use lbfgs::Lbfgs;

use ndarray::Array1;

use crate::error::TrainError;
use crate::training::params::Parameter;
use crate::training::problem::Problem;

/// An iterative minimizer of a [`Problem`].
///
/// `solve` mutates `w` in place until a tolerance from `params` is met or
/// `max_epoch` is reached. Solvers are transient: one instance drives one
/// training call.
pub trait Solver {
    /// Minimize `problem` starting from (and writing back into) `w`.
    fn solve<P: Problem>(
        &mut self,
        problem: &mut P,
        params: &Parameter,
        w: &mut Array1<f64>,
    ) -> Result<(), TrainError>;
}
