//! Metrics for evaluating label predictions against ground truth.
//!
//! [`ClassificationReport`] gathers everything needed to judge a classifier on held-out data:
//!
//! - the [`ConfusionMatrix`] (rows are actual labels, columns are predicted labels)
//! - per-class [`ClassMetrics`] (precision, recall, F1 score and support)
//! - the overall accuracy
//!
//! Labels are plain strings. The set of classes is the sorted union of the labels seen in
//! either the actual or the predicted values, so a class that is only ever predicted still
//! gets a row (with zero support).
//!
//! Undefined ratios (no predictions for a class, or no actual samples of it) are reported
//! as `0.0`.

use std::{collections::BTreeSet, fmt};

/// Counts of (actual, predicted) label pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Builds the matrix from paired actual/predicted labels.
    ///
    /// # Panics
    ///
    /// Panics if `actual` and `predicted` have different lengths.
    #[must_use]
    pub fn new<S>(actual: &[S], predicted: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        assert_eq!(
            actual.len(),
            predicted.len(),
            "actual and predicted labels must have the same length"
        );

        let labels = actual
            .iter()
            .chain(predicted)
            .map(|s| s.as_ref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let mut counts = vec![vec![0; labels.len()]; labels.len()];
        for (a, p) in actual.iter().zip(predicted) {
            let (Some(i), Some(j)) = (
                Self::position(&labels, a.as_ref()),
                Self::position(&labels, p.as_ref()),
            ) else {
                unreachable!("labels are collected from the inputs");
            };
            counts[i][j] += 1;
        }

        Self { labels, counts }
    }

    fn position(labels: &[String], label: &str) -> Option<usize> {
        labels
            .binary_search_by(|l| l.as_str().cmp(label))
            .ok()
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of samples whose actual label is `actual` and predicted label is `predicted`.
    #[must_use]
    pub fn count(&self, actual: &str, predicted: &str) -> usize {
        match (
            Self::position(&self.labels, actual),
            Self::position(&self.labels, predicted),
        ) {
            (Some(i), Some(j)) => self.counts[i][j],
            _ => 0,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn true_positives(&self, i: usize) -> usize {
        self.counts[i][i]
    }

    fn actual_total(&self, i: usize) -> usize {
        self.counts[i].iter().sum()
    }

    fn predicted_total(&self, j: usize) -> usize {
        self.counts.iter().map(|row| row[j]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(String::len)
            .chain(
                self.counts
                    .iter()
                    .flatten()
                    .map(|c| c.to_string().len()),
            )
            .max()
            .unwrap_or(1)
            + 2;

        write!(f, "{:>width$}", "")?;
        for label in &self.labels {
            write!(f, "{label:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{label:>width$}")?;
            for count in row {
                write!(f, "{count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Precision, recall, F1 score and support of a single class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of samples whose actual label is this class.
    pub support: usize,
}

/// Full evaluation of a set of predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
}

impl ClassificationReport {
    /// Evaluates `predicted` against `actual`.
    ///
    /// # Returns
    ///
    /// * `Some(ClassificationReport)` - if at least one sample is given
    /// * `None` - if the inputs are empty
    ///
    /// # Panics
    ///
    /// Panics if `actual` and `predicted` have different lengths.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<S>(actual: &[S], predicted: &[S]) -> Option<Self>
    where
        S: AsRef<str>,
    {
        if actual.is_empty() && predicted.is_empty() {
            return None;
        }
        let confusion_matrix = ConfusionMatrix::new(actual, predicted);

        let ratio = |num: usize, den: usize| {
            if den == 0 {
                0.0
            } else {
                num as f64 / den as f64
            }
        };

        let classes = confusion_matrix
            .labels()
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let tp = confusion_matrix.true_positives(i);
                let support = confusion_matrix.actual_total(i);
                let precision = ratio(tp, confusion_matrix.predicted_total(i));
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect::<Vec<_>>();

        let correct = (0..classes.len())
            .map(|i| confusion_matrix.true_positives(i))
            .sum();
        let accuracy = ratio(correct, confusion_matrix.total());

        Some(Self {
            confusion_matrix,
            classes,
            accuracy,
        })
    }

    #[must_use]
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }

    /// Unweighted mean of the per-class F1 scores.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn macro_f1(&self) -> f64 {
        if self.classes.is_empty() {
            return 0.0;
        }
        self.classes.iter().map(|c| c.f1).sum::<f64>() / self.classes.len() as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain(["accuracy".len(), "macro f1".len()])
            .max()
            .unwrap_or(0)
            + 2;

        writeln!(
            f,
            "{:>width$}{:>11}{:>11}{:>11}{:>11}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$}{:>11.3}{:>11.3}{:>11.3}{:>11}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}{:>33.3}{:>11}",
            "accuracy",
            self.accuracy,
            self.confusion_matrix.total()
        )?;
        writeln!(f, "{:>width$}{:>33.3}", "macro f1", self.macro_f1())?;
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows: actual, columns: predicted):")?;
        write!(f, "{}", self.confusion_matrix)
    }
}
