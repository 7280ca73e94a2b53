//! CART decision tree classifier.
//!
//! Trees operate on class indices (`0..n_classes`); mapping to and from label strings is
//! the forest's job. Each leaf stores the class distribution of the training samples that
//! reached it, so forests can average probabilities rather than count votes.
//!
//! # Split search
//!
//! At every node the features are visited in a random order until `max_features` of them
//! that are not constant on the node's samples have been examined. For each examined feature
//! the samples are sorted by value and every boundary between two distinct values is tried
//! as a threshold (the midpoint of the two values).
//! The split with the lowest weighted child impurity wins; ties keep the first candidate
//! found. A node becomes a leaf when it is pure, too small to split, at maximum depth, or
//! no candidate split lowers the impurity.

use std::fmt;

use ndarray::{ArrayView1, ArrayView2};
use rand::{Rng, seq::SliceRandom as _};
use serde::{Deserialize, Serialize};

use crate::{FitError, PredictError};

/// Impurity measure used to rank candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    #[display("gini")]
    Gini,
    #[display("entropy")]
    Entropy,
}

impl Criterion {
    #[expect(clippy::cast_precision_loss)]
    fn impurity(self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        let probabilities = counts.iter().filter(|c| **c > 0).map(|c| *c as f64 / n);
        match self {
            Self::Gini => 1.0 - probabilities.map(|p| p * p).sum::<f64>(),
            Self::Entropy => -probabilities.map(|p| p * p.log2()).sum::<f64>(),
        }
    }
}

/// Number of features examined at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`
    Sqrt,
    /// `ceil(log2(n_features))`
    Log2,
    /// A fixed count, capped at `n_features`.
    Fixed(usize),
    /// Every feature.
    All,
}

impl MaxFeatures {
    /// Resolves the strategy for a dataset with `n_features` columns. Always at least 1.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            Self::Sqrt => n.sqrt().ceil() as usize,
            Self::Log2 => n.log2().ceil() as usize,
            Self::Fixed(k) => k,
            Self::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }
}

impl fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqrt => f.write_str("sqrt"),
            Self::Log2 => f.write_str("log2"),
            Self::Fixed(k) => write!(f, "{k}"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Growth limits of a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub criterion: Criterion,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            criterion: Criterion::Gini,
            max_depth: None,
            max_features: MaxFeatures::All,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    params: TreeParams,
    n_features: usize,
    n_classes: usize,
    root: Option<Node>,
}

impl DecisionTree {
    #[must_use]
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            n_features: 0,
            n_classes: 0,
            root: None,
        }
    }

    /// Fits the tree on `x` with class indices `y` (each `< n_classes`).
    pub fn fit<R>(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: &[usize],
        n_classes: usize,
        rng: &mut R,
    ) -> Result<(), FitError>
    where
        R: Rng + ?Sized,
    {
        if x.nrows() != y.len() {
            return Err(FitError::LengthMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }
        if y.is_empty() {
            return Err(FitError::EmptyDataset);
        }
        if x.ncols() == 0 {
            return Err(FitError::InvalidParameter {
                reason: "feature matrix has no columns".to_owned(),
            });
        }
        if let Some(&class) = y.iter().find(|c| **c >= n_classes) {
            return Err(FitError::InvalidParameter {
                reason: format!("class index {class} out of range for {n_classes} classes"),
            });
        }
        if self.params.min_samples_leaf == 0 || self.params.min_samples_split < 2 {
            return Err(FitError::InvalidParameter {
                reason: "min_samples_leaf must be >= 1 and min_samples_split >= 2".to_owned(),
            });
        }

        self.n_features = x.ncols();
        self.n_classes = n_classes;
        let mut indices = (0..y.len()).collect::<Vec<_>>();
        let builder = TreeBuilder {
            params: &self.params,
            x,
            y,
            n_classes,
        };
        self.root = Some(builder.build(&mut indices, 0, rng));
        Ok(())
    }

    /// Class distribution of the leaf reached by `row`.
    pub fn predict_proba_row(&self, row: ArrayView1<'_, f64>) -> Result<&[f64], PredictError> {
        let mut node = self.root.as_ref().ok_or(PredictError::NotFitted)?;
        if row.len() != self.n_features {
            return Err(PredictError::FeatureCountMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        loop {
            match node {
                Node::Leaf { distribution } => return Ok(distribution),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Most probable class index for `row`; ties go to the lowest index.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<usize, PredictError> {
        self.predict_proba_row(row).map(argmax)
    }

    /// Depth of the tree, a lone leaf having depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        fn depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => count(left) + count(right),
            }
        }
        self.root.as_ref().map_or(0, count)
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

struct TreeBuilder<'a, 'x> {
    params: &'a TreeParams,
    x: ArrayView2<'x, f64>,
    y: &'a [usize],
    n_classes: usize,
}

impl TreeBuilder<'_, '_> {
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    #[expect(clippy::cast_precision_loss)]
    fn leaf(counts: &[usize], total: usize) -> Node {
        let n = total as f64;
        Node::Leaf {
            distribution: counts.iter().map(|c| *c as f64 / n).collect(),
        }
    }

    fn build<R>(&self, indices: &mut [usize], depth: usize, rng: &mut R) -> Node
    where
        R: Rng + ?Sized,
    {
        let n = indices.len();
        let counts = self.class_counts(indices);
        let parent_impurity = self.params.criterion.impurity(&counts, n);

        let is_pure = counts.iter().filter(|c| **c > 0).count() <= 1;
        let at_max_depth = self.params.max_depth.is_some_and(|d| depth >= d);
        if is_pure || at_max_depth || n < self.params.min_samples_split {
            return Self::leaf(&counts, n);
        }

        let Some(split) = self.find_best_split(indices, parent_impurity, rng) else {
            return Self::leaf(&counts, n);
        };

        // stable partition: samples with value <= threshold first
        indices.sort_by_key(|&i| self.x[[i, split.feature]] > split.threshold);
        let n_left = indices
            .iter()
            .take_while(|&&i| self.x[[i, split.feature]] <= split.threshold)
            .count();
        let (left, right) = indices.split_at_mut(n_left);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(left, depth + 1, rng)),
            right: Box::new(self.build(right, depth + 1, rng)),
        }
    }

    fn find_best_split<R>(
        &self,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut R,
    ) -> Option<SplitCandidate>
    where
        R: Rng + ?Sized,
    {
        let n_features = self.x.ncols();
        let k = self.params.max_features.resolve(n_features);
        let mut features = (0..n_features).collect::<Vec<_>>();
        features.shuffle(rng);

        let min_leaf = self.params.min_samples_leaf;
        let n = indices.len();
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();
        let mut examined = 0;

        for feature in features {
            if examined == k {
                break;
            }
            let column = self.x.column(feature);
            sorted.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
            // constant features do not use up the budget
            if column[sorted[0]] >= column[sorted[n - 1]] {
                continue;
            }
            examined += 1;

            let mut left_counts = vec![0; self.n_classes];
            let mut right_counts = self.class_counts(&sorted);
            for pos in 0..n - 1 {
                let class = self.y[sorted[pos]];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let n_left = pos + 1;
                let n_right = n - n_left;
                let (lo, hi) = (column[sorted[pos]], column[sorted[pos + 1]]);
                if lo >= hi || n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let impurity = self.weighted_impurity(&left_counts, n_left, &right_counts, n_right);
                if best.is_none_or(|b| impurity < b.impurity) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: f64::midpoint(lo, hi),
                        impurity,
                    });
                }
            }
        }

        best.filter(|b| b.impurity < parent_impurity - 1e-12)
    }

    #[expect(clippy::cast_precision_loss)]
    fn weighted_impurity(
        &self,
        left: &[usize],
        n_left: usize,
        right: &[usize],
        n_right: usize,
    ) -> f64 {
        let criterion = self.params.criterion;
        let n = (n_left + n_right) as f64;
        (n_left as f64 * criterion.impurity(left, n_left)
            + n_right as f64 * criterion.impurity(right, n_right))
            / n
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(0)
    }

    #[test]
    fn test_impurity_values() {
        assert!((Criterion::Gini.impurity(&[5, 5], 10) - 0.5).abs() < 1e-12);
        assert!((Criterion::Entropy.impurity(&[5, 5], 10) - 1.0).abs() < 1e-12);
        assert!(Criterion::Gini.impurity(&[10, 0], 10).abs() < 1e-12);
        assert!(Criterion::Entropy.impurity(&[0, 0], 0).abs() < 1e-12);
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(27), 6);
        assert_eq!(MaxFeatures::Sqrt.resolve(9), 3);
        assert_eq!(MaxFeatures::Log2.resolve(8), 3);
        assert_eq!(MaxFeatures::Fixed(100).resolve(9), 9);
        assert_eq!(MaxFeatures::Fixed(0).resolve(9), 1);
        assert_eq!(MaxFeatures::All.resolve(17), 17);
    }

    #[test]
    fn test_fits_separable_data() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = [0, 0, 1, 1];
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(x.view(), &y, 2, &mut rng()).unwrap();

        for (row, expected) in x.rows().into_iter().zip(y) {
            assert_eq!(tree.predict_row(row).unwrap(), expected);
        }
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    /// Fits on a caller-owned view with labels that live only inside this function.
    fn fit_on_view(x: ArrayView2<'_, f64>) -> DecisionTree {
        let y = (0..x.nrows()).map(|i| usize::from(i >= x.nrows() / 2)).collect::<Vec<_>>();
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(x, &y, 2, &mut rng()).unwrap();
        tree
    }

    #[test]
    fn test_fits_borrowed_subview() {
        let x = array![
            [1.0, 5.0, 0.0],
            [2.0, 6.0, 0.0],
            [3.0, 7.0, 0.0],
            [4.0, 8.0, 0.0],
            [9.0, 9.0, 9.0],
        ];
        let tree = fit_on_view(x.slice(ndarray::s![..4, ..2]));
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(array![1.5, 5.5].view()).unwrap(), 0);
        assert_eq!(tree.predict_row(array![3.5, 7.5].view()).unwrap(), 1);
        assert!(tree.predict_row(x.row(0)).is_err());
    }

    #[test]
    fn test_learns_xor_with_two_levels() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = [0, 1, 1, 0];
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(x.view(), &y, 2, &mut rng()).unwrap();
        // XOR has no single informative split, so the root stays a leaf
        assert_eq!(tree.depth(), 0);

        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        let y = [0, 1, 1, 0, 0];
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(x.view(), &y, 2, &mut rng()).unwrap();
        for (row, expected) in x.rows().into_iter().zip(y) {
            assert_eq!(tree.predict_row(row).unwrap(), expected);
        }
    }

    #[test]
    fn test_max_depth_is_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = [0, 1, 0, 1, 0, 1];
        let params = TreeParams {
            max_depth: Some(2),
            ..TreeParams::default()
        };
        let mut tree = DecisionTree::new(params);
        tree.fit(x.view(), &y, 2, &mut rng()).unwrap();
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_leaf_distribution_sums_to_one() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = [0, 1, 1];
        let mut tree = DecisionTree::new(TreeParams::default());
        tree.fit(x.view(), &y, 3, &mut rng()).unwrap();
        let distribution = tree.predict_proba_row(x.row(0)).unwrap();
        assert_eq!(distribution.len(), 3);
        assert!((distribution.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(tree.predict_row(x.row(0)).unwrap(), 1);
    }

    #[test]
    fn test_errors() {
        let x = array![[1.0], [2.0]];
        let mut tree = DecisionTree::new(TreeParams::default());
        assert_eq!(
            tree.fit(x.view(), &[0], 2, &mut rng()),
            Err(FitError::LengthMismatch { rows: 2, labels: 1 })
        );
        assert!(matches!(
            tree.fit(x.view(), &[0, 5], 2, &mut rng()),
            Err(FitError::InvalidParameter { .. })
        ));
        assert_eq!(
            tree.predict_row(x.row(0)),
            Err(PredictError::NotFitted)
        );

        tree.fit(x.view(), &[0, 1], 2, &mut rng()).unwrap();
        let wide = array![1.0, 2.0];
        assert_eq!(
            tree.predict_row(wide.view()),
            Err(PredictError::FeatureCountMismatch {
                expected: 1,
                actual: 2
            })
        );
    }
}
