//! Summary of a small sample of scores.

/// Location and spread of a sample, such as the per-fold accuracies of one
/// cross-validated candidate.
///
/// Variance and standard deviation are population statistics (divided by `n`), matching
/// how fold scores are usually reported.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Summarizes `values`, or returns `None` for an empty sample.
    ///
    /// ```
    /// # use noughts_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([0.75, 1.0, 0.5, 0.75]).unwrap();
    /// assert_eq!(stats.min, 0.5);
    /// assert_eq!(stats.max, 1.0);
    /// assert_eq!(stats.mean, 0.75);
    /// assert_eq!(stats.median, 0.75);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sample = values.into_iter().collect::<Vec<_>>();
        sample.sort_by(f64::total_cmp);
        let (&min, &max) = (sample.first()?, sample.last()?);

        let count = sample.len();
        let mean = sample.iter().sum::<f64>() / count as f64;
        let mid = count / 2;
        let median = if count % 2 == 0 {
            f64::midpoint(sample[mid - 1], sample[mid])
        } else {
            sample[mid]
        };
        let variance = sample.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}
