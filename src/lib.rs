//! sparselin: regularized logistic regression over sparse features.
//!
//! Trains binary classifiers on sparse, high-dimensional feature vectors
//! with L1- or L2-regularized logistic loss, driven by a limited-memory
//! BFGS solver (or plain gradient descent) with a backtracking Armijo line
//! search.
//!
//! # Key Types
//!
//! - [`LogisticRegression`] - trainer and prediction front end
//! - [`Parameter`] / [`SolverKind`] / [`Penalty`] - training configuration
//! - [`Dataset`] / [`CscMatrix`] - sparse training data
//! - [`Model`] - trained weights, export/reload-able
//!
//! # Training
//!
//! Build a [`Dataset`] (one sparse column per sample), pick a [`Parameter`],
//! and call [`LogisticRegression::train`]. Prediction takes sparse feature
//! vectors as `(index, value)` pairs. See the [`training`] module for the
//! solver internals.
//!
//! File formats, argument parsing, and other I/O belong to the embedding
//! application; this crate consumes in-memory datasets and produces
//! in-memory models (serde-serializable for transport).

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod error;
pub mod inference;
pub mod model;
pub mod testing;
pub mod training;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Data types (for preparing training data)
pub use data::{CscMatrix, Dataset, NO_BIAS};

// Error taxonomy
pub use error::{DataError, TrainError};

// Trained model
pub use model::Model;

// Training types (most users want these)
pub use training::{
    LogisticRegression, Parameter, Penalty, SolverKind, Verbosity,
};
