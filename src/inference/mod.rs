//! Prediction over a trained [`Model`].
//!
//! A feature vector is an ordered sequence of `(feature_index, value)` pairs
//! with 0-based indices in `[0, dimension)`. When the model carries a bias
//! feature the cached bias values are added; callers never pass the bias
//! entry themselves.

use crate::model::Model;

#[inline]
fn sigmoid(t: f64) -> f64 {
    1.0 / (1.0 + (-t).exp())
}

impl Model {
    /// Accumulate the raw decision values `W^T x` into `wtx`.
    ///
    /// `wtx` must hold one slot per weight column and is *not* cleared;
    /// prediction entry points zero it first.
    ///
    /// # Panics
    ///
    /// Debug-asserts that `wtx.len() == n_ws` and every feature index is in
    /// bounds.
    pub fn predict_wtx(&self, x: &[(usize, f64)], wtx: &mut [f64]) {
        let n_ws = self.n_ws();
        debug_assert_eq!(wtx.len(), n_ws);
        for &(feature, value) in x {
            debug_assert!(
                feature < self.dimension(),
                "feature index {} out of bounds for dimension {}",
                feature,
                self.dimension()
            );
            for (col, out) in wtx.iter_mut().enumerate() {
                *out += value * self.weight(feature, col);
            }
        }
        if let Some(bias_values) = self.bias_values() {
            for (out, &b) in wtx.iter_mut().zip(bias_values) {
                *out += b;
            }
        }
    }

    /// Predict the label of `x`.
    ///
    /// Binary models threshold the single decision value at zero; otherwise
    /// the label of the column with the largest decision value wins.
    pub fn predict(&self, x: &[(usize, f64)]) -> f64 {
        let mut wtx = vec![0.0; self.n_ws()];
        self.predict_wtx(x, &mut wtx);
        if self.n_classes() == 2 {
            if wtx[0] > 0.0 {
                self.labels()[0]
            } else {
                self.labels()[1]
            }
        } else {
            let mut best = 0;
            for (col, &value) in wtx.iter().enumerate() {
                if value > wtx[best] {
                    best = col;
                }
            }
            self.labels()[best]
        }
    }

    /// Predict the label of `x` and fill `probs` with one probability per
    /// class.
    ///
    /// Binary models apply the logistic sigmoid to the decision value;
    /// otherwise each column is squashed independently and the result is
    /// L1-normalized across columns.
    pub fn predict_proba(&self, x: &[(usize, f64)], probs: &mut Vec<f64>) -> f64 {
        probs.clear();
        probs.resize(self.n_classes(), 0.0);
        if self.n_classes() == 2 {
            let mut wtx = [0.0];
            self.predict_wtx(x, &mut wtx);
            let label = if wtx[0] > 0.0 {
                self.labels()[0]
            } else {
                self.labels()[1]
            };
            probs[0] = sigmoid(wtx[0]);
            probs[1] = 1.0 - probs[0];
            label
        } else {
            self.predict_wtx(x, probs);
            let mut sum = 0.0;
            for p in probs.iter_mut() {
                *p = sigmoid(*p);
                sum += *p;
            }
            let mut best = 0;
            for col in 1..probs.len() {
                if probs[col] > probs[best] {
                    best = col;
                }
            }
            for p in probs.iter_mut() {
                *p /= sum;
            }
            self.labels()[best]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn binary_model(bias_values: Option<Vec<f64>>) -> Model {
        Model::from_parts(
            2,
            2,
            if bias_values.is_some() { 1.0 } else { -1.0 },
            vec![1.0, -1.0],
            vec![1.0, -2.0],
            bias_values,
        )
        .unwrap()
    }

    #[test]
    fn wtx_accumulates_sparse_entries() {
        let model = binary_model(None);
        let mut wtx = [0.0];
        model.predict_wtx(&[(0, 2.0), (1, 1.0)], &mut wtx);
        assert_relative_eq!(wtx[0], 2.0 - 2.0);
    }

    #[test]
    fn wtx_adds_bias_values() {
        let model = binary_model(Some(vec![0.5]));
        let mut wtx = [0.0];
        model.predict_wtx(&[(0, 1.0)], &mut wtx);
        assert_relative_eq!(wtx[0], 1.5);
    }

    #[test]
    fn binary_predict_thresholds_at_zero() {
        let model = binary_model(None);
        assert_eq!(model.predict(&[(0, 1.0)]), 1.0);
        assert_eq!(model.predict(&[(1, 1.0)]), -1.0);
        // an empty feature vector scores exactly zero -> second label
        assert_eq!(model.predict(&[]), -1.0);
    }

    #[test]
    fn binary_proba_is_sigmoid_and_complement() {
        let model = binary_model(None);
        let mut probs = Vec::new();
        let label = model.predict_proba(&[(0, 1.0)], &mut probs);
        assert_eq!(label, 1.0);
        assert_relative_eq!(probs[0], 1.0 / (1.0 + (-1.0f64).exp()));
        assert_relative_eq!(probs[0] + probs[1], 1.0);
    }

    #[test]
    fn multiclass_predict_takes_argmax() {
        // 3 classes, 2 features, weights favor class 2 on feature 1
        let model = Model::from_parts(
            3,
            2,
            -1.0,
            vec![10.0, 20.0, 30.0],
            vec![
                1.0, 0.0, 0.0, // feature 0
                0.0, 0.5, 2.0, // feature 1
            ],
            None,
        )
        .unwrap();
        assert_eq!(model.predict(&[(1, 1.0)]), 30.0);
        assert_eq!(model.predict(&[(0, 1.0)]), 10.0);
    }

    #[test]
    fn multiclass_proba_sums_to_one() {
        let model = Model::from_parts(
            3,
            2,
            -1.0,
            vec![10.0, 20.0, 30.0],
            vec![1.0, -1.0, 0.5, 0.0, 0.25, 2.0],
            None,
        )
        .unwrap();
        let mut probs = Vec::new();
        let label = model.predict_proba(&[(0, 1.0), (1, 1.0)], &mut probs);
        assert_eq!(probs.len(), 3);
        assert_relative_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        // highest probability class is the returned label
        let best = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(label, model.labels()[best]);
    }
}
