//! Training orchestration: stratification, per-sample penalties, solver
//! dispatch, and model assembly.

use ndarray::{Array1, Array2};

use crate::data::Dataset;
use crate::error::TrainError;
use crate::model::Model;
use crate::training::logger::TrainingLogger;
use crate::training::params::{Parameter, SolverKind};
use crate::training::problem::LogisticProblem;
use crate::training::solver::{GradientDescent, Lbfgs, Solver};

// =============================================================================
// Stratification
// =============================================================================

/// Class grouping of a dataset's samples.
///
/// `perm_idx` is a permutation of `0..n_samples` that, applied to the sample
/// columns (`new column k = old column perm_idx[k]`), groups same-class
/// samples contiguously in class order while preserving relative order
/// within a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPartition {
    /// Samples per class, indexed by class.
    pub count: Vec<usize>,
    /// First permuted position of each class block.
    pub start_idx: Vec<usize>,
    /// The grouping permutation.
    pub perm_idx: Vec<usize>,
}

/// Group samples by class with a stable bucket sort.
///
/// # Errors
///
/// Returns [`TrainError::LabelMismatch`] if any sample's target is not in
/// the dataset's label set: that is corrupt data, not a solvable problem.
pub fn stratify(dataset: &Dataset) -> Result<ClassPartition, TrainError> {
    let n_samples = dataset.n_samples();
    let n_classes = dataset.n_classes();
    let labels = dataset.labels();

    let mut count = vec![0usize; n_classes];
    let mut class_of = Vec::with_capacity(n_samples);
    for (sample, &label) in dataset.y().iter().enumerate() {
        let class = labels
            .iter()
            .position(|&l| l == label)
            .ok_or(TrainError::LabelMismatch { sample, label })?;
        count[class] += 1;
        class_of.push(class);
    }

    let mut start_idx = Vec::with_capacity(n_classes);
    start_idx.push(0);
    for class in 1..n_classes {
        start_idx.push(start_idx[class - 1] + count[class - 1]);
    }

    // fill buckets with a moving cursor copy so start_idx survives
    let mut cursor = start_idx.clone();
    let mut perm_idx = vec![0usize; n_samples];
    for (sample, &class) in class_of.iter().enumerate() {
        perm_idx[cursor[class]] = sample;
        cursor[class] += 1;
    }

    Ok(ClassPartition {
        count,
        start_idx,
        perm_idx,
    })
}

// =============================================================================
// LogisticRegression
// =============================================================================

/// Trainer and prediction front end for regularized logistic regression.
///
/// Holds at most one trained [`Model`] at a time. [`export_model`] moves the
/// model out (after which the trainer reports untrained); [`load_model`]
/// moves one back in. The model is never shared: ownership transfers are
/// by value.
///
/// [`export_model`]: LogisticRegression::export_model
/// [`load_model`]: LogisticRegression::load_model
///
/// # Example
///
/// ```
/// use sparselin::data::{CscMatrix, Dataset, NO_BIAS};
/// use sparselin::training::{LogisticRegression, Parameter, Verbosity};
///
/// let x = CscMatrix::from_dense_columns(
///     2,
///     &[vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0], vec![0.0, -1.0]],
/// );
/// let mut dataset = Dataset::new(
///     x,
///     vec![1.0, 1.0, -1.0, -1.0],
///     vec![1.0, -1.0],
///     NO_BIAS,
/// )
/// .unwrap();
///
/// let params = Parameter { verbosity: Verbosity::Silent, ..Default::default() };
/// let mut lr = LogisticRegression::new();
/// lr.train(&mut dataset, &params).unwrap();
/// assert_eq!(lr.predict(&[(0, 2.0)]), Some(1.0));
/// ```
#[derive(Debug, Default)]
pub struct LogisticRegression {
    model: Option<Model>,
}

impl LogisticRegression {
    /// Create an untrained instance.
    pub fn new() -> Self {
        Self { model: None }
    }

    /// Create an instance around an existing model.
    pub fn from_model(model: Model) -> Self {
        Self { model: Some(model) }
    }

    /// Whether a model is currently held.
    #[inline]
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Borrow the trained model, if any.
    #[inline]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Take ownership of the trained model, leaving the trainer untrained.
    pub fn export_model(&mut self) -> Option<Model> {
        self.model.take()
    }

    /// Install a model, replacing any currently held one.
    pub fn load_model(&mut self, model: Model) {
        self.model = Some(model);
    }

    /// Train on `dataset` with `params`, storing the resulting model.
    ///
    /// The dataset is mutated in place: for signed binary labels the label
    /// order is normalized so +1 leads, sample columns are permuted to group
    /// classes contiguously, and `y` is relabeled to +/-1 for the binary
    /// subproblem.
    ///
    /// # Errors
    ///
    /// See [`TrainError`]; notably [`TrainError::UnsupportedClassCount`] for
    /// anything but two classes.
    pub fn train(&mut self, dataset: &mut Dataset, params: &Parameter) -> Result<(), TrainError> {
        params.validate()?;
        let n_samples = dataset.n_samples();
        let dimension = dataset.dimension();
        let n_classes = dataset.n_classes();
        if n_classes != 2 {
            return Err(TrainError::UnsupportedClassCount { n_classes });
        }
        let logger = TrainingLogger::new(params.verbosity);

        // keep the +1 label in front for signed binary label sets so the
        // positive class forms the first permuted block
        if dataset.labels() == &[-1.0, 1.0][..] {
            dataset.swap_labels(0, 1);
        }

        let partition = stratify(dataset)?;
        dataset.permute_samples(&partition.perm_idx);

        // per-class penalty weights: base_c times any matching adjust_c
        // multiplier
        let mut class_c = vec![params.base_c; n_classes];
        for &(label, multiplier) in &params.adjust_c {
            match dataset.labels().iter().position(|&l| l == label) {
                Some(class) => class_c[class] *= multiplier,
                None => logger.warn(format_args!(
                    "adjust_c label {label} not found in dataset labels, ignored"
                )),
            }
        }

        let pos_count = partition.count[0];
        dataset.relabel_binary(pos_count);
        let mut c = vec![class_c[1]; n_samples];
        for ci in c.iter_mut().take(pos_count) {
            *ci = class_c[0];
        }

        let mut w = Array1::zeros(dimension);
        {
            let mut problem = LogisticProblem::new(dataset, c, params.penalty);
            match params.solver {
                SolverKind::Lbfgs => {
                    Lbfgs::new(params.m_step).solve(&mut problem, params, &mut w)?
                }
                SolverKind::GradientDescent => {
                    GradientDescent::new().solve(&mut problem, params, &mut w)?
                }
            }
        }

        // binary classification trains a single weight column
        let bias_values = if dataset.bias() > 0.0 {
            Some(vec![dataset.bias() * w[dimension - 1]])
        } else {
            None
        };
        let weights: Array2<f64> = w.insert_axis(ndarray::Axis(1));
        self.model = Some(Model::from_training(
            n_classes,
            dataset.bias(),
            dataset.labels().to_vec(),
            weights,
            bias_values,
        ));
        Ok(())
    }

    /// Predict the label of a sparse feature vector, or `None` when
    /// untrained.
    pub fn predict(&self, x: &[(usize, f64)]) -> Option<f64> {
        self.model.as_ref().map(|m| m.predict(x))
    }

    /// Predict the label and per-class probabilities, or `None` when
    /// untrained.
    pub fn predict_proba(&self, x: &[(usize, f64)], probs: &mut Vec<f64>) -> Option<f64> {
        self.model.as_ref().map(|m| m.predict_proba(x, probs))
    }
}

// =============================================================================
// Tests
// =============================================================================
