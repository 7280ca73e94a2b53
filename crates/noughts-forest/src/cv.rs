//! Stratified k-fold splitting.
//!
//! Samples are grouped by label (labels in sorted order, samples in input order) and dealt
//! round-robin onto the folds. The dealing position carries over from one label to the next,
//! so fold sizes differ by at most one and every fold keeps roughly the class proportions of
//! the whole dataset. No shuffling takes place: the same labels always give the same folds.

use std::collections::BTreeMap;

use crate::FitError;

/// One train/test partition, as row indices into the original dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl StratifiedKFold {
    #[must_use]
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn split<S>(&self, labels: &[S]) -> Result<Vec<Fold>, FitError>
    where
        S: AsRef<str>,
    {
        let k = self.n_splits;
        if k < 2 {
            return Err(FitError::InvalidParameter {
                reason: format!("cross validation needs at least 2 folds, got {k}"),
            });
        }
        if labels.is_empty() {
            return Err(FitError::EmptyDataset);
        }

        let mut by_label = BTreeMap::<&str, Vec<usize>>::new();
        for (i, label) in labels.iter().enumerate() {
            by_label.entry(label.as_ref()).or_default().push(i);
        }

        if let Some((label, rows)) = by_label.iter().max_by_key(|(_, rows)| rows.len())
            && rows.len() < k
        {
            return Err(FitError::TooFewSamples {
                label: (*label).to_owned(),
                count: rows.len(),
                folds: k,
            });
        }
        for (label, rows) in &by_label {
            if rows.len() < k {
                tracing::warn!(
                    label,
                    count = rows.len(),
                    folds = k,
                    "class has fewer samples than folds"
                );
            }
        }

        let mut assignment = vec![0; labels.len()];
        let mut position = 0;
        for rows in by_label.values() {
            for &row in rows {
                assignment[row] = position % k;
                position += 1;
            }
        }

        let folds = (0..k)
            .map(|fold| {
                let (test, train) = (0..labels.len()).partition(|&i| assignment[i] == fold);
                Fold { train, test }
            })
            .collect();
        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folds_partition_all_rows() {
        let labels = ["a", "b", "a", "a", "b", "c", "a", "b", "c", "a"];
        let folds = StratifiedKFold::new(3).split(&labels).unwrap();
        assert_eq!(folds.len(), 3);

        let mut seen = folds.iter().flat_map(|f| f.test.clone()).collect::<Vec<_>>();
        seen.sort_unstable();
        assert_eq!(seen, (0..labels.len()).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), labels.len());
            assert!(fold.train.iter().all(|i| !fold.test.contains(i)));
        }
    }

    #[test]
    fn test_folds_are_stratified() {
        let labels = (0..50)
            .map(|i| if i % 5 == 0 { "rare" } else { "common" })
            .collect::<Vec<_>>();
        let folds = StratifiedKFold::new(5).split(&labels).unwrap();
        for fold in &folds {
            assert_eq!(fold.test.len(), 10);
            let rare = fold.test.iter().filter(|&&i| labels[i] == "rare").count();
            assert_eq!(rare, 2);
        }
    }

    #[test]
    fn test_fold_sizes_differ_by_at_most_one() {
        let labels = ["a", "a", "b", "b", "b", "c", "c"];
        let folds = StratifiedKFold::new(2).split(&labels).unwrap();
        let sizes = folds.iter().map(|f| f.test.len()).collect::<Vec<_>>();
        assert_eq!(sizes, [4, 3]);
    }

    #[test]
    fn test_split_is_deterministic() {
        let labels = ["x", "o", "x", "nobody", "o", "x", "o", "x"];
        let cv = StratifiedKFold::new(2);
        assert_eq!(cv.split(&labels).unwrap(), cv.split(&labels).unwrap());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            StratifiedKFold::new(1).split(&["a", "b"]),
            Err(FitError::InvalidParameter { .. })
        ));
        let empty: [&str; 0] = [];
        assert_eq!(
            StratifiedKFold::new(2).split(&empty),
            Err(FitError::EmptyDataset)
        );
        assert_eq!(
            StratifiedKFold::new(3).split(&["a", "a", "b"]),
            Err(FitError::TooFewSamples {
                label: "a".to_owned(),
                count: 2,
                folds: 3,
            })
        );
    }
}
