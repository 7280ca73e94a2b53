//! Exhaustive hyperparameter search with cross-validated scoring.

use ndarray::{ArrayView2, Axis};
use noughts_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

use crate::{
    FitError,
    cv::StratifiedKFold,
    forest::{ForestParams, RandomForest},
    tree::{Criterion, MaxFeatures},
};

/// Values to try for each searched hyperparameter.
///
/// Candidates are the cartesian product of all lists. Parameters not listed here are taken
/// from the base [`ForestParams`] of the [`GridSearch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_features: Vec<MaxFeatures>,
    pub max_depth: Vec<Option<usize>>,
    pub criterion: Vec<Criterion>,
}

impl ParamGrid {
    /// Expands the grid on top of `base`.
    ///
    /// The order is fixed: `criterion` varies slowest, then `max_depth`, `max_features`, and
    /// `n_estimators` fastest.
    #[must_use]
    pub fn candidates(&self, base: &ForestParams) -> Vec<ForestParams> {
        let mut candidates = vec![];
        for &criterion in &self.criterion {
            for &max_depth in &self.max_depth {
                for &max_features in &self.max_features {
                    for &n_estimators in &self.n_estimators {
                        candidates.push(ForestParams {
                            n_estimators,
                            criterion,
                            max_depth,
                            max_features,
                            ..*base
                        });
                    }
                }
            }
        }
        candidates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.n_estimators.len()
            * self.max_features.len()
            * self.max_depth.len()
            * self.criterion.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cross-validated accuracy of one candidate.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub fold_scores: Vec<f64>,
    pub stats: DescriptiveStats,
}

#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best_params: ForestParams,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
    /// Forest with the best parameters, fitted on the full dataset.
    pub best_estimator: RandomForest,
}

#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    base: ForestParams,
    cv: StratifiedKFold,
}

impl GridSearch {
    #[must_use]
    pub fn new(grid: ParamGrid, base: ForestParams, cv_folds: usize) -> Self {
        Self {
            grid,
            base,
            cv: StratifiedKFold::new(cv_folds),
        }
    }

    /// Scores every candidate in order and refits the best one on all of `x`.
    ///
    /// Ties on mean accuracy keep the earlier candidate.
    pub fn fit<S>(&self, x: ArrayView2<'_, f64>, labels: &[S]) -> Result<GridSearchResult, FitError>
    where
        S: AsRef<str>,
    {
        if x.nrows() != labels.len() {
            return Err(FitError::LengthMismatch {
                rows: x.nrows(),
                labels: labels.len(),
            });
        }
        let candidates = self.grid.candidates(&self.base);
        if candidates.is_empty() {
            return Err(FitError::InvalidParameter {
                reason: "parameter grid has no candidates".to_owned(),
            });
        }
        let folds = self.cv.split(labels)?;

        tracing::info!(
            candidates = candidates.len(),
            folds = folds.len(),
            samples = labels.len(),
            "starting grid search"
        );

        let mut scores = Vec::with_capacity(candidates.len());
        let mut best: Option<(usize, f64)> = None;
        for (i, params) in candidates.into_iter().enumerate() {
            let mut fold_scores = Vec::with_capacity(folds.len());
            for fold in &folds {
                let x_train = x.select(Axis(0), &fold.train);
                let y_train = fold.train.iter().map(|&r| labels[r].as_ref()).collect::<Vec<_>>();
                let mut forest = RandomForest::new(params);
                forest.fit(x_train.view(), &y_train)?;

                let x_test = x.select(Axis(0), &fold.test);
                let predicted = forest
                    .predict(x_test.view())
                    .map_err(|source| FitError::Scoring { source })?;
                fold_scores.push(accuracy(
                    fold.test.iter().map(|&r| labels[r].as_ref()),
                    &predicted,
                ));
            }
            let Some(stats) = DescriptiveStats::new(fold_scores.iter().copied()) else {
                return Err(FitError::EmptyDataset);
            };
            tracing::info!(
                candidate = i,
                criterion = %params.criterion,
                max_depth = ?params.max_depth,
                max_features = %params.max_features,
                n_estimators = params.n_estimators,
                mean_accuracy = stats.mean,
                std_dev = stats.std_dev,
                "evaluated candidate"
            );
            if best.is_none_or(|(_, score)| stats.mean > score) {
                best = Some((i, stats.mean));
            }
            scores.push(CandidateScore {
                params,
                fold_scores,
                stats,
            });
        }

        let Some((best_index, best_score)) = best else {
            return Err(FitError::InvalidParameter {
                reason: "parameter grid has no candidates".to_owned(),
            });
        };
        let best_params = scores[best_index].params;
        tracing::info!(candidate = best_index, best_score, "refitting best candidate");

        let mut best_estimator = RandomForest::new(best_params);
        best_estimator.fit(x, labels)?;

        Ok(GridSearchResult {
            best_params,
            best_score,
            candidates: scores,
            best_estimator,
        })
    }
}

#[expect(clippy::cast_precision_loss)]
fn accuracy<'a, I>(actual: I, predicted: &[String]) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    if predicted.is_empty() {
        return 0.0;
    }
    let correct = actual
        .into_iter()
        .zip(predicted)
        .filter(|(a, p)| *a == p.as_str())
        .count();
    correct as f64 / predicted.len() as f64
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    fn small_grid() -> ParamGrid {
        ParamGrid {
            n_estimators: vec![3],
            max_features: vec![MaxFeatures::All],
            max_depth: vec![Some(1), None],
            criterion: vec![Criterion::Gini, Criterion::Entropy],
        }
    }

    /// Label depends on both features, so a depth-1 tree cannot fit it.
    fn two_feature_data() -> (Array2<f64>, Vec<&'static str>) {
        let mut rows = vec![];
        let mut labels = vec![];
        for i in 0..60 {
            let a = f64::from(i % 6);
            let b = f64::from((i / 6) % 5);
            rows.extend([a, b]);
            labels.push(if (a < 3.0) == (b < 2.0) { "same" } else { "diff" });
        }
        (Array2::from_shape_vec((60, 2), rows).unwrap(), labels)
    }

    #[test]
    fn test_candidate_order() {
        let grid = small_grid();
        let candidates = grid.candidates(&ForestParams::default());
        assert_eq!(grid.len(), 4);
        assert_eq!(candidates.len(), 4);
        let keys = candidates
            .iter()
            .map(|p| (p.criterion, p.max_depth))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            [
                (Criterion::Gini, Some(1)),
                (Criterion::Gini, None),
                (Criterion::Entropy, Some(1)),
                (Criterion::Entropy, None),
            ]
        );
        assert!(candidates.iter().all(|p| p.n_estimators == 3));
    }

    #[test]
    fn test_search_prefers_deeper_trees() {
        let (x, y) = two_feature_data();
        let search = GridSearch::new(small_grid(), ForestParams::default(), 5);
        let result = search.fit(x.view(), &y).unwrap();

        assert_eq!(result.candidates.len(), 4);
        assert_eq!(result.best_params.max_depth, None);
        assert!(result.best_score > 0.75);
        assert!(
            result
                .candidates
                .iter()
                .all(|c| c.fold_scores.len() == 5 && c.stats.mean <= result.best_score)
        );
        assert_eq!(result.best_estimator.params(), &result.best_params);
        assert_eq!(result.best_estimator.classes(), ["diff", "same"]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let (x, y) = two_feature_data();
        let search = GridSearch::new(small_grid(), ForestParams::default(), 3);
        let a = search.fit(x.view(), &y).unwrap();
        let b = search.fit(x.view(), &y).unwrap();
        assert_eq!(a.best_params, b.best_params);
        assert_eq!(a.best_estimator, b.best_estimator);
    }

    #[test]
    fn test_first_candidate_wins_ties() {
        let x = Array2::from_shape_vec((10, 1), (0..10).map(f64::from).collect()).unwrap();
        let y = (0..10).map(|i| if i < 5 { "lo" } else { "hi" }).collect::<Vec<_>>();
        let grid = ParamGrid {
            n_estimators: vec![2],
            max_features: vec![MaxFeatures::All],
            max_depth: vec![None],
            criterion: vec![Criterion::Gini, Criterion::Entropy],
        };
        let result = GridSearch::new(grid, ForestParams::default(), 2)
            .fit(x.view(), &y)
            .unwrap();
        let scores = result.candidates.iter().map(|c| c.stats.mean).collect::<Vec<_>>();
        if (scores[0] - scores[1]).abs() < f64::EPSILON {
            assert_eq!(result.best_params.criterion, Criterion::Gini);
        }
    }

    #[test]
    fn test_empty_grid() {
        let (x, y) = two_feature_data();
        let grid = ParamGrid {
            n_estimators: vec![],
            ..small_grid()
        };
        assert!(grid.is_empty());
        assert!(matches!(
            GridSearch::new(grid, ForestParams::default(), 5).fit(x.view(), &y),
            Err(FitError::InvalidParameter { .. })
        ));
    }
}
