//! Limited-memory BFGS solver.
//!
//! Maintains a bounded window of curvature pairs `(s_k, y_k, rho_k)` with
//! `s_k = w_{k+1} - w_k`, `y_k = grad_{k+1} - grad_k`, `rho_k = 1/(y_k . s_k)`
//! and approximates the inverse-Hessian product with the standard two-loop
//! recursion. For L1 problems the search direction is restricted to the
//! orthant of the pseudo-gradient before stepping.

use ndarray::Array1;

use crate::error::TrainError;
use crate::training::line_search::LineSearch;
use crate::training::logger::TrainingLogger;
use crate::training::params::Parameter;
use crate::training::problem::{Penalty, Problem};
use crate::training::solver::Solver;

// =============================================================================
// Curvature history
// =============================================================================

/// One stored curvature pair.
#[derive(Debug, Clone)]
struct CurvaturePair {
    s: Array1<f64>,
    y: Array1<f64>,
    rho: f64,
}

/// Fixed-capacity ring buffer of curvature pairs.
///
/// The capacity bound is structural: pushing into a full buffer overwrites
/// the oldest pair. Logical index 0 is always the oldest stored pair.
#[derive(Debug)]
struct CurvatureHistory {
    pairs: Vec<CurvaturePair>,
    capacity: usize,
    /// Physical index of the oldest pair once the buffer has wrapped.
    head: usize,
}

impl CurvatureHistory {
    fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            pairs: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Pair at logical position `k` (0 = oldest, `len() - 1` = newest).
    #[inline]
    fn get(&self, k: usize) -> &CurvaturePair {
        debug_assert!(k < self.len());
        &self.pairs[(self.head + k) % self.pairs.len()]
    }

    /// Append a pair, evicting the oldest when full.
    fn push(&mut self, pair: CurvaturePair) {
        if self.pairs.len() < self.capacity {
            self.pairs.push(pair);
        } else {
            self.pairs[self.head] = pair;
            self.head = (self.head + 1) % self.capacity;
        }
    }
}

// =============================================================================
// Solver
// =============================================================================

/// L-BFGS with backtracking line search.
#[derive(Debug)]
pub struct Lbfgs {
    history: CurvatureHistory,
    line_search: LineSearch,
}

impl Lbfgs {
    /// Create a solver keeping up to `m_step` curvature pairs.
    pub fn new(m_step: usize) -> Self {
        Self {
            history: CurvatureHistory::with_capacity(m_step),
            line_search: LineSearch::default(),
        }
    }

    /// Two-loop recursion: approximate `H^-1 * steepest` over the stored
    /// history. With an empty history this is the identity.
    fn two_loop(&self, steepest: &Array1<f64>) -> Array1<f64> {
        let mut p = steepest.clone();
        let m = self.history.len();
        if m == 0 {
            return p;
        }

        let mut alpha = vec![0.0; m];
        for k in (0..m).rev() {
            let pair = self.history.get(k);
            alpha[k] = pair.rho * pair.s.dot(&p);
            p.scaled_add(-alpha[k], &pair.y);
        }

        // initial Hessian scaling from the newest pair
        let newest = self.history.get(m - 1);
        let gamma = newest.s.dot(&newest.y) / newest.y.dot(&newest.y);
        p *= gamma;

        for k in 0..m {
            let pair = self.history.get(k);
            let beta = pair.rho * pair.y.dot(&p);
            p.scaled_add(alpha[k] - beta, &pair.s);
        }
        p
    }

    /// Compute the descent direction from the steepest (regularized)
    /// gradient.
    ///
    /// For L1, coordinates where the two-loop output disagrees with (or is
    /// orthogonal to) the pseudo-gradient sign are zeroed so the step stays
    /// inside the current orthant.
    fn search_direction(&self, penalty: Penalty, steepest: &Array1<f64>) -> Array1<f64> {
        let mut p = self.two_loop(steepest);
        if penalty == Penalty::L1 {
            for (pi, &gi) in p.iter_mut().zip(steepest.iter()) {
                if gi * *pi <= 0.0 {
                    *pi = 0.0;
                }
            }
        }
        p.mapv_inplace(|v| -v);
        p
    }

    /// Store the curvature pair for the accepted step.
    ///
    /// `y . s == 0` would make `rho` undefined; the pair is replaced by the
    /// all-ones vector and the solve continues with a warning. This happens
    /// when consecutive gradients are (numerically) identical and is not an
    /// error.
    fn push_history(
        &mut self,
        logger: &TrainingLogger,
        w: &Array1<f64>,
        next_w: &Array1<f64>,
        grad: &Array1<f64>,
        next_grad: &Array1<f64>,
    ) {
        let s = next_w - w;
        let mut y = next_grad - grad;
        let mut denom = y.dot(&s);
        if denom == 0.0 {
            logger.warn(format_args!(
                "degenerate curvature (y . s == 0), substituting unit gradient difference"
            ));
            y.fill(1.0);
            denom = y.dot(&s);
        }
        let rho = 1.0 / denom;
        self.history.push(CurvaturePair { s, y, rho });
    }

    fn steepest_for<P: Problem>(
        problem: &P,
        penalty: Penalty,
        w: &Array1<f64>,
        grad: &Array1<f64>,
    ) -> Array1<f64> {
        match penalty {
            // L1 keeps the smooth gradient for the curvature history and
            // applies the pseudo-gradient to a copy
            Penalty::L1 => {
                let mut steepest = grad.clone();
                problem.regularized_gradient(w, &mut steepest);
                steepest
            }
            // the L2 problem already folds the penalty into gradient()
            Penalty::L2 => grad.clone(),
        }
    }
}

impl Solver for Lbfgs {
    fn solve<P: Problem>(
        &mut self,
        problem: &mut P,
        params: &Parameter,
        w: &mut Array1<f64>,
    ) -> Result<(), TrainError> {
        let logger = TrainingLogger::new(params.verbosity);
        let dimension = w.len();
        let penalty = problem.penalty();

        let mut loss = problem.loss(w);
        if loss < params.abs_tol {
            logger.converged("l-bfgs", 0, loss, "already optimal");
            return Ok(());
        }

        let mut grad = Array1::zeros(dimension);
        problem.gradient(w, &mut grad);
        let mut steepest = Self::steepest_for(problem, penalty, w, &grad);

        logger.start("l-bfgs", params.max_epoch);

        let mut next_w = Array1::zeros(dimension);
        let mut next_grad = Array1::zeros(dimension);

        for epoch in 0..params.max_epoch {
            let p = self.search_direction(penalty, &steepest);
            let step = self.line_search.search(
                problem,
                w,
                loss,
                &steepest,
                &p,
                epoch == 0,
                &mut next_w,
            )?;

            let rela_improve = ((step.next_loss - loss) / loss).abs();
            logger.epoch(epoch, step.next_loss, rela_improve, step.evals);
            logger.debug(format_args!(
                "epoch {epoch}: accepted alpha {:.3e} after {} evaluations",
                step.alpha, step.evals
            ));

            if rela_improve < params.rela_tol || step.next_loss < params.abs_tol {
                w.assign(&next_w);
                logger.converged("l-bfgs", epoch, step.next_loss, "tolerance reached");
                return Ok(());
            }

            problem.gradient(&next_w, &mut next_grad);
            let next_steepest = Self::steepest_for(problem, penalty, &next_w, &next_grad);

            self.push_history(&logger, w, &next_w, &grad, &next_grad);

            loss = step.next_loss;
            w.assign(&next_w);
            grad.assign(&next_grad);
            steepest = next_steepest;
        }

        logger.converged("l-bfgs", params.max_epoch, loss, "epoch budget exhausted");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
