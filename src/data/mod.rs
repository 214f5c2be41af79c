//! Data containers: sparse feature matrix and labeled dataset.

mod dataset;
mod sparse;

pub use dataset::{Dataset, NO_BIAS};
pub use sparse::CscMatrix;
