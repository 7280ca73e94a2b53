//! Random forest classifier over string labels.
//!
//! # Fitting
//!
//! 1. The distinct labels are sorted and become the forest's class table.
//! 2. For tree `t`, a [`Pcg32`] is seeded with `seed + t`.
//! 3. If bootstrapping is enabled, `n` rows are drawn with replacement from that generator.
//! 4. A [`DecisionTree`] is grown on the sample, drawing its feature subsets from the same
//!    generator.
//!
//! # Prediction
//!
//! The leaf distributions of all trees are averaged and the most probable class wins. Ties
//! go to the class that sorts first.

use std::collections::BTreeSet;

use ndarray::{ArrayView1, ArrayView2, Axis};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    FitError, PredictError,
    tree::{Criterion, DecisionTree, MaxFeatures, TreeParams, argmax},
};

/// Hyperparameters of a [`RandomForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub criterion: Criterion,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            criterion: Criterion::Gini,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 0,
        }
    }
}

impl ForestParams {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            criterion: self.criterion,
            max_depth: self.max_depth,
            max_features: self.max_features,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    classes: Vec<String>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    #[must_use]
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            classes: vec![],
            n_features: 0,
            trees: vec![],
        }
    }

    #[must_use]
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Sorted class labels seen during fitting.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fits the forest, replacing any previously fitted trees.
    pub fn fit<S>(&mut self, x: ArrayView2<'_, f64>, labels: &[S]) -> Result<(), FitError>
    where
        S: AsRef<str>,
    {
        if x.nrows() != labels.len() {
            return Err(FitError::LengthMismatch {
                rows: x.nrows(),
                labels: labels.len(),
            });
        }
        if labels.is_empty() {
            return Err(FitError::EmptyDataset);
        }
        if self.params.n_estimators == 0 {
            return Err(FitError::InvalidParameter {
                reason: "n_estimators must be at least 1".to_owned(),
            });
        }
        if let Some(((row, column), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(FitError::NonFiniteFeature { row, column });
        }

        let classes = labels
            .iter()
            .map(AsRef::as_ref)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let y = labels
            .iter()
            .map(|l| {
                classes
                    .binary_search_by(|c| c.as_str().cmp(l.as_ref()))
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();

        let n_samples = labels.len();
        let tree_params = self.params.tree_params();
        let mut trees = Vec::with_capacity(self.params.n_estimators);
        for t in 0..self.params.n_estimators {
            let mut rng = Pcg32::seed_from_u64(self.params.seed.wrapping_add(t as u64));
            let mut tree = DecisionTree::new(tree_params);
            if self.params.bootstrap {
                let sample = (0..n_samples)
                    .map(|_| rng.random_range(0..n_samples))
                    .collect::<Vec<_>>();
                let x_boot = x.select(Axis(0), &sample);
                let y_boot = sample.iter().map(|&i| y[i]).collect::<Vec<_>>();
                tree.fit(x_boot.view(), &y_boot, classes.len(), &mut rng)?;
            } else {
                tree.fit(x, &y, classes.len(), &mut rng)?;
            }
            trees.push(tree);
        }

        self.classes = classes;
        self.n_features = x.ncols();
        self.trees = trees;
        Ok(())
    }

    /// Mean class distribution over all trees, indexed like [`RandomForest::classes`].
    #[expect(clippy::cast_precision_loss)]
    pub fn predict_proba_row(&self, row: ArrayView1<'_, f64>) -> Result<Vec<f64>, PredictError> {
        if !self.is_fitted() {
            return Err(PredictError::NotFitted);
        }
        if row.len() != self.n_features {
            return Err(PredictError::FeatureCountMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        let mut total = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let distribution = tree.predict_proba_row(row)?;
            for (t, p) in total.iter_mut().zip(distribution) {
                *t += p;
            }
        }
        let n = self.trees.len() as f64;
        for t in &mut total {
            *t /= n;
        }
        Ok(total)
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<&str, PredictError> {
        let probabilities = self.predict_proba_row(row)?;
        Ok(&self.classes[argmax(&probabilities)])
    }

    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<String>, PredictError> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_row(row).map(str::to_owned))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};

    use super::*;

    /// Two noisy clusters: label "a" when the first feature is small, "b" otherwise.
    fn clusters() -> (Array2<f64>, Vec<&'static str>) {
        let mut rows = vec![];
        let mut labels = vec![];
        for i in 0..40 {
            let v = f64::from(i);
            rows.extend([v, (v * 7.0) % 5.0, (v * 3.0) % 4.0]);
            labels.push(if i < 20 { "a" } else { "b" });
        }
        (Array2::from_shape_vec((40, 3), rows).unwrap(), labels)
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = clusters();
        let mut forest = RandomForest::new(ForestParams {
            n_estimators: 10,
            ..ForestParams::default()
        });
        forest.fit(x.view(), &y).unwrap();

        assert_eq!(forest.classes(), ["a", "b"]);
        assert_eq!(forest.trees().len(), 10);
        assert_eq!(forest.predict_row(array![0.0, 0.0, 0.0].view()).unwrap(), "a");
        assert_eq!(forest.predict_row(array![39.0, 3.0, 1.0].view()).unwrap(), "b");

        let predicted = forest.predict(x.view()).unwrap();
        let correct = predicted.iter().zip(&y).filter(|(p, a)| p == a).count();
        assert!(correct >= 36, "only {correct} of 40 correct");
    }

    #[test]
    fn test_rejects_wrong_row_width() {
        let (x, y) = clusters();
        let mut forest = RandomForest::new(ForestParams {
            n_estimators: 3,
            ..ForestParams::default()
        });
        assert_eq!(
            forest.predict_row(array![0.0, 0.0, 0.0].view()),
            Err(PredictError::NotFitted)
        );
        forest.fit(x.view(), &y).unwrap();
        assert_eq!(
            forest.predict_row(array![0.0, 0.0].view()),
            Err(PredictError::FeatureCountMismatch {
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = clusters();
        let mut forest = RandomForest::new(ForestParams {
            n_estimators: 7,
            max_depth: Some(2),
            ..ForestParams::default()
        });
        forest.fit(x.view(), &y).unwrap();
        for row in x.rows() {
            let p = forest.predict_proba_row(row).unwrap();
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = clusters();
        let params = ForestParams {
            n_estimators: 5,
            seed: 17,
            ..ForestParams::default()
        };
        let mut a = RandomForest::new(params);
        let mut b = RandomForest::new(params);
        a.fit(x.view(), &y).unwrap();
        b.fit(x.view(), &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_keeps_predictions() {
        let (x, y) = clusters();
        let mut forest = RandomForest::new(ForestParams {
            n_estimators: 4,
            ..ForestParams::default()
        });
        forest.fit(x.view(), &y).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(
            restored.predict(x.view()).unwrap(),
            forest.predict(x.view()).unwrap()
        );
    }

    #[test]
    fn test_errors() {
        let forest = RandomForest::new(ForestParams::default());
        assert_eq!(
            forest.predict_row(array![1.0].view()),
            Err(PredictError::NotFitted)
        );

        let mut forest = RandomForest::new(ForestParams::default());
        let x = array![[1.0], [f64::NAN]];
        assert_eq!(
            forest.fit(x.view(), &["a", "b"]),
            Err(FitError::NonFiniteFeature { row: 1, column: 0 })
        );
        let empty = Array2::<f64>::zeros((0, 1));
        let no_labels: [&str; 0] = [];
        assert_eq!(
            forest.fit(empty.view(), &no_labels),
            Err(FitError::EmptyDataset)
        );

        let mut forest = RandomForest::new(ForestParams {
            n_estimators: 0,
            ..ForestParams::default()
        });
        assert!(matches!(
            forest.fit(array![[1.0]].view(), &["a"]),
            Err(FitError::InvalidParameter { .. })
        ));
    }
}
