//! Fixed-step gradient descent.

use ndarray::Array1;

use crate::error::TrainError;
use crate::training::logger::TrainingLogger;
use crate::training::params::Parameter;
use crate::training::problem::Problem;
use crate::training::solver::Solver;

/// Plain gradient descent with a constant learning rate.
///
/// Kept as the simple baseline solver; L-BFGS is the default and converges
/// far faster on these problems. Stops when the absolute epoch-to-epoch loss
/// change falls below `rela_tol` or the loss falls below `abs_tol`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientDescent;

impl GradientDescent {
    /// Create a gradient descent solver.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for GradientDescent {
    fn solve<P: Problem>(
        &mut self,
        problem: &mut P,
        params: &Parameter,
        w: &mut Array1<f64>,
    ) -> Result<(), TrainError> {
        let logger = TrainingLogger::new(params.verbosity);
        logger.start("gd", params.max_epoch);

        let learning_rate = params.learning_rate;
        let mut grad = Array1::zeros(w.len());
        let mut last_loss = 0.0;

        for epoch in 0..params.max_epoch {
            let loss = problem.loss(w);
            let improve = (loss - last_loss).abs();
            logger.epoch(epoch, loss, improve, 1);

            if improve < params.rela_tol || loss < params.abs_tol {
                logger.converged("gd", epoch, loss, "tolerance reached");
                break;
            }
            last_loss = loss;

            problem.gradient(w, &mut grad);
            w.scaled_add(-learning_rate, &grad);
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
