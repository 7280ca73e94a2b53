//! Turning a submitted board into a prediction.

use ndarray::Array1;
use noughts_engine::{Board, BoardParseError};
use noughts_forest::PredictError;
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{
    data::TransformError,
    recipe::{self, ModelVariant, Partition},
    table::Table,
    training::{ColumnMismatchError, TrainedModel},
};

/// A single unlabeled feature vector with its column names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub columns: Vec<String>,
    pub values: Array1<f64>,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PredictionError {
    #[display("invalid board state: {_0}")]
    InvalidBoard(BoardParseError),
    #[display("{_0}")]
    Transform(TransformError),
    #[display("{_0}")]
    ColumnMismatch(ColumnMismatchError),
    #[display("prediction failed: {_0}")]
    Predict(PredictError),
}

/// Encodes `board_state` with the same pipeline the variant's test partition goes through.
pub fn handle_user_input(
    board_state: &str,
    variant: ModelVariant,
) -> Result<FeatureRow, PredictionError> {
    let board = board_state.parse::<Board>()?;
    let table = Table::from_boards([(None, board)]);
    // Inference pipelines never resample, so the generator is never drawn from.
    let mut rng = Pcg32::seed_from_u64(0);
    let table = recipe::apply(variant.pipeline(Partition::Test), table, &mut rng)?;
    let features = table.to_features()?;
    Ok(FeatureRow {
        columns: features.columns,
        values: features.x.row(0).to_owned(),
    })
}

/// Runs the model on `row` and returns the bare predicted label.
pub fn evaluate_prediction(
    model: &TrainedModel,
    row: &FeatureRow,
) -> Result<String, PredictionError> {
    model.check_columns(&row.columns)?;
    let label = model.forest.predict_row(row.values.view())?;
    Ok(label.to_owned())
}
