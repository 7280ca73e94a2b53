//! Tree-ensemble classifier and model selection for small tabular datasets.
//!
//! This crate provides the numeric engine behind model training:
//!
//! 1. **Decision Tree** ([`tree`]) - CART classifier with Gini or entropy impurity, depth
//!    limits and per-node random feature subsets.
//! 2. **Random Forest** ([`forest`]) - Bootstrap-aggregated trees with averaged class
//!    probabilities. Labels are strings; the forest keeps its own class table.
//! 3. **Cross Validation** ([`cv`]) - Deterministic stratified k-fold splitting.
//! 4. **Grid Search** ([`grid_search`]) - Exhaustive search over a [`ParamGrid`], scoring each
//!    candidate by mean cross-validated accuracy and refitting the winner on all data.
//!
//! # Architecture
//!
//! ```text
//! GridSearch
//!     ↓ for each candidate in ParamGrid
//! StratifiedKFold  →  RandomForest::fit on k-1 folds, accuracy on the held-out fold
//!     ↓ best mean accuracy
//! RandomForest::fit on the full dataset
//!     ↓ made of
//! DecisionTree (one per bootstrap sample)
//! ```
//!
//! # Determinism
//!
//! Every random choice (bootstrap rows, feature subsets) is drawn from a [`rand_pcg::Pcg32`]
//! seeded from [`ForestParams::seed`] and the tree index. Fitting the same data with the same
//! parameters always yields the same forest, and evaluation is sequential.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use noughts_forest::{ForestParams, RandomForest};
//!
//! let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
//! let y = ["low", "low", "high", "high"];
//!
//! let mut forest = RandomForest::new(ForestParams {
//!     n_estimators: 5,
//!     bootstrap: false,
//!     ..ForestParams::default()
//! });
//! forest.fit(x.view(), &y).unwrap();
//! assert_eq!(forest.predict_row(x.row(3)).unwrap(), "high");
//! ```

pub use self::{cv::*, forest::*, grid_search::*, tree::*};

pub mod cv;
pub mod forest;
pub mod grid_search;
pub mod tree;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FitError {
    #[display("cannot fit on an empty dataset")]
    EmptyDataset,
    #[display("feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },
    #[display("feature value at row {row}, column {column} is not finite")]
    NonFiniteFeature { row: usize, column: usize },
    #[display("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
    #[display("class {label:?} has {count} samples, fewer than the {folds} folds requested")]
    TooFewSamples {
        label: String,
        count: usize,
        folds: usize,
    },
    #[display("failed to score a fitted candidate: {source}")]
    Scoring { source: PredictError },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PredictError {
    #[display("model has not been fitted")]
    NotFitted,
    #[display("expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
}
