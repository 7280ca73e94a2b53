//! Dataset partitioning, model training and evaluation.

use chrono::{DateTime, Utc};
use noughts_forest::{FitError, ForestParams, GridSearch, PredictError, RandomForest};
use noughts_stats::classification::ClassificationReport;
use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    config::ServiceConfig,
    data::TransformError,
    dataset::{self, DatasetError},
    recipe::{self, ModelVariant, Partition},
    table::{Features, Table},
};

/// A fitted classifier together with what is needed to feed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub variant: ModelVariant,
    pub trained_at: DateTime<Utc>,
    /// Feature columns in the order the forest was trained on.
    pub feature_columns: Vec<String>,
    /// Mean cross-validated accuracy of the selected parameters.
    pub cv_score: f64,
    pub forest: RandomForest,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("model expects columns [{}], got [{}]", expected.join(", "), found.join(", "))]
pub struct ColumnMismatchError {
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl TrainedModel {
    pub fn check_columns(&self, columns: &[String]) -> Result<(), ColumnMismatchError> {
        if self.feature_columns != columns {
            return Err(ColumnMismatchError {
                expected: self.feature_columns.clone(),
                found: columns.to_vec(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid train fraction {train_fraction}, expected a value between 0 and 1")]
    #[from(ignore)]
    InvalidTrainFraction { train_fraction: f64 },
    #[display("test partition is empty")]
    #[from(ignore)]
    EmptyTestSet,
    #[display("{_0}")]
    Dataset(DatasetError),
    #[display("{_0}")]
    Transform(TransformError),
    #[display("{_0}")]
    ColumnMismatch(ColumnMismatchError),
    #[display("training failed: {_0}")]
    Fit(FitError),
    #[display("prediction failed: {_0}")]
    Predict(PredictError),
}

/// Shuffles the rows with a generator seeded by `seed` and splits them into a train and a
/// test table. The train table gets `floor(train_fraction * rows)` rows.
pub fn split_dataset(
    table: Table,
    train_fraction: f64,
    seed: u64,
) -> Result<(Table, Table), TrainingError> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(TrainingError::InvalidTrainFraction { train_fraction });
    }
    let mut order = (0..table.len()).collect::<Vec<_>>();
    order.shuffle(&mut Pcg32::seed_from_u64(seed));
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    let n_train = (train_fraction * table.len() as f64).floor() as usize;

    let (columns, rows) = table.into_parts();
    let mut rows = rows.into_iter().map(Some).collect::<Vec<_>>();
    let mut take = |indices: &[usize]| {
        let rows = indices.iter().filter_map(|&i| rows[i].take()).collect();
        Table::from_parts(columns.clone(), rows)
    };
    let train = take(&order[..n_train]);
    let test = take(&order[n_train..]);
    Ok((train, test))
}

/// Loads the dataset, selects `partition` and runs the variant's pipeline for it.
pub fn import_dataset(
    config: &ServiceConfig,
    variant: ModelVariant,
    partition: Partition,
) -> Result<Features, TrainingError> {
    let table = dataset::load_dataset(&config.dataset_path)?;
    let (train, test) = split_dataset(table, config.train_fraction, config.seed)?;
    let table = match partition {
        Partition::Train => train,
        Partition::Test => test,
    };
    let mut rng = Pcg32::seed_from_u64(config.seed);
    let table = recipe::apply(variant.pipeline(partition), table, &mut rng)?;
    let features = table.to_features()?;
    tracing::info!(
        %variant,
        ?partition,
        rows = features.x.nrows(),
        columns = features.columns.len(),
        "prepared features"
    );
    Ok(features)
}

/// Selects forest parameters by grid search on the training partition and returns the best
/// forest refitted on the whole partition.
pub fn train(config: &ServiceConfig, variant: ModelVariant) -> Result<TrainedModel, TrainingError> {
    let features = import_dataset(config, variant, Partition::Train)?;
    let labels = features.require_labels()?;

    let base = ForestParams {
        seed: config.seed,
        ..ForestParams::default()
    };
    let search = GridSearch::new(config.param_grid.clone(), base, config.cv_folds);
    let result = search.fit(features.x.view(), &labels)?;
    tracing::info!(
        %variant,
        cv_score = result.best_score,
        criterion = %result.best_params.criterion,
        max_depth = ?result.best_params.max_depth,
        "trained model"
    );

    Ok(TrainedModel {
        variant,
        trained_at: Utc::now(),
        feature_columns: features.columns,
        cv_score: result.best_score,
        forest: result.best_estimator,
    })
}

/// Scores `model` on labeled `features`.
pub fn test(model: &TrainedModel, features: &Features) -> Result<ClassificationReport, TrainingError> {
    model.check_columns(&features.columns)?;
    let actual = features.require_labels()?;
    let predicted = model.forest.predict(features.x.view())?;
    let predicted = predicted.iter().map(String::as_str).collect::<Vec<_>>();
    let report =
        ClassificationReport::new(&actual, &predicted).ok_or(TrainingError::EmptyTestSet)?;
    tracing::info!(variant = %model.variant, accuracy = report.accuracy, "evaluated model");
    Ok(report)
}
