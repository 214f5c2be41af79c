//! Backtracking line search with the Armijo sufficient-decrease condition.

use ndarray::Array1;

use crate::error::TrainError;
use crate::training::problem::Problem;

/// Sufficient-decrease constant `c1` in the Armijo condition.
const C1: f64 = 1e-4;

/// Step shrink factor for ordinary epochs.
const BACKOFF: f64 = 0.5;

/// Step shrink factor for the first epoch, where the initial step is the
/// scale-matching `1 / ||p||^2` and a coarser schedule suffices.
const FIRST_EPOCH_BACKOFF: f64 = 0.1;

/// Outcome of an accepted line search.
#[derive(Debug, Clone, Copy)]
pub struct LineSearchStep {
    /// Accepted step length.
    pub alpha: f64,
    /// Loss at the accepted point.
    pub next_loss: f64,
    /// Number of loss evaluations spent.
    pub evals: usize,
}

/// Backtracking searcher for a step length along a descent direction.
#[derive(Debug, Clone, Copy)]
pub struct LineSearch {
    /// Maximum number of backtracking evaluations before giving up.
    pub max_steps: usize,
}

impl Default for LineSearch {
    fn default() -> Self {
        Self { max_steps: 50 }
    }
}

impl LineSearch {
    /// Find an `alpha` satisfying
    /// `loss(w + alpha p) <= loss + c1 * alpha * (grad . p)`.
    ///
    /// Writes the accepted point into `next_w` (via the problem's update
    /// rule, so L1 problems project into the current orthant).
    ///
    /// # Errors
    ///
    /// - [`TrainError::NonDescentDirection`] if `grad . p >= 0`. A direction
    ///   that does not descend means the caller's gradient or direction
    ///   construction is wrong; the solve must abort.
    /// - [`TrainError::LineSearchFailed`] if no step within `max_steps`
    ///   shrinkages satisfies the condition.
    pub fn search<P: Problem>(
        &self,
        problem: &mut P,
        w: &Array1<f64>,
        loss: f64,
        grad: &Array1<f64>,
        p: &Array1<f64>,
        first_epoch: bool,
        next_w: &mut Array1<f64>,
    ) -> Result<LineSearchStep, TrainError> {
        let directional = grad.dot(p);
        if directional >= 0.0 {
            return Err(TrainError::NonDescentDirection { directional });
        }

        let (mut alpha, backoff) = if first_epoch {
            (1.0 / p.dot(p), FIRST_EPOCH_BACKOFF)
        } else {
            (1.0, BACKOFF)
        };

        for evals in 1..=self.max_steps {
            problem.update_weights(next_w, w, p, alpha);
            let next_loss = problem.loss(next_w);
            if next_loss <= loss + C1 * alpha * directional {
                return Ok(LineSearchStep {
                    alpha,
                    next_loss,
                    evals,
                });
            }
            alpha *= backoff;
        }
        Err(TrainError::LineSearchFailed {
            steps: self.max_steps,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
