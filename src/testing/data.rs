//! Synthetic binary classification data.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::{CscMatrix, Dataset, NO_BIAS};

/// Shape of a generated two-blob dataset.
#[derive(Debug, Clone, Copy)]
pub struct BlobSpec {
    /// Samples per class.
    pub n_per_class: usize,
    /// Feature dimension, excluding any bias row.
    pub n_features: usize,
    /// Distance of each blob center from the origin along every axis.
    pub separation: f64,
    /// Half-width of the uniform noise added per coordinate.
    pub noise: f64,
    /// Bias feature value appended as the last row, or [`NO_BIAS`].
    pub bias: f64,
}

impl Default for BlobSpec {
    fn default() -> Self {
        Self {
            n_per_class: 16,
            n_features: 2,
            separation: 2.0,
            noise: 1.0,
            bias: NO_BIAS,
        }
    }
}

/// Generate a linearly separable two-class dataset with labels `{+1, -1}`.
///
/// The positive blob is centered at `(+separation, ...)`, the negative blob
/// at its mirror image. Samples are interleaved (+, -, +, -, ...) so the
/// training orchestrator's stratification has actual work to do. With the
/// default `separation > noise` the classes cannot overlap.
pub fn interleaved_blobs(spec: BlobSpec, seed: u64) -> Dataset {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let n_samples = 2 * spec.n_per_class;
    let with_bias = spec.bias >= 0.0;
    let dimension = spec.n_features + usize::from(with_bias);

    let mut columns = Vec::with_capacity(n_samples);
    let mut y = Vec::with_capacity(n_samples);
    for _ in 0..spec.n_per_class {
        for &sign in &[1.0, -1.0] {
            let mut column = Vec::with_capacity(dimension);
            for _ in 0..spec.n_features {
                let noise = (rng.gen::<f64>() * 2.0 - 1.0) * spec.noise;
                column.push(sign * spec.separation + noise);
            }
            if with_bias {
                column.push(spec.bias);
            }
            columns.push(column);
            y.push(sign);
        }
    }

    let x = CscMatrix::from_dense_columns(dimension, &columns);
    Dataset::new(x, y, vec![1.0, -1.0], spec.bias)
        .expect("generated shapes are consistent")
}
