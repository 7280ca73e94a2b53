//! Request orchestration and the `{status, message}` response contract.
//!
//! Each use case validates its input, calls the services and maps the outcome onto a
//! [`Response`]: `200` with the result, `400` with `"Invalid request"` for validation
//! failures, and `500` with a generic message for anything else. Server errors are logged
//! with their source chain and never leak into the response.

use std::{fmt::Write as _, fs};

use serde::{Deserialize, Serialize};

use crate::{
    config::ServiceConfig,
    file::{ModelFileError, ModelStore},
    prediction::{self, PredictionError},
    recipe::Partition,
    training::{self, TrainingError},
    validator::{self, ValidationError},
};

pub const INVALID_REQUEST: &str = "Invalid request";
pub const SERVER_ERROR: &str = "Server was unable to process the request";
pub const TRAINED: &str = "Model successfully trained";

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ServerError {
    #[display("failed to create model directory: {_0}")]
    ModelDir(std::io::Error),
    #[display("{_0}")]
    ModelFile(ModelFileError),
    #[display("{_0}")]
    Training(TrainingError),
    #[display("{_0}")]
    Prediction(PredictionError),
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ControllerError {
    #[display("invalid request: {source}")]
    Validation { source: ValidationError },
    #[display("server error: {source}")]
    Server { source: ServerError },
}

impl From<ValidationError> for ControllerError {
    fn from(source: ValidationError) -> Self {
        Self::Validation { source }
    }
}

impl From<ServerError> for ControllerError {
    fn from(source: ServerError) -> Self {
        Self::Server { source }
    }
}

/// Outcome of a controller call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub message: String,
}

impl Response {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: 200,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_error(error: &ControllerError) -> Self {
        match error {
            ControllerError::Validation { source } => {
                tracing::warn!(error = %source, "rejected request");
                Self {
                    status: 400,
                    message: INVALID_REQUEST.to_owned(),
                }
            }
            ControllerError::Server { source } => {
                tracing::error!(error = %error_chain(source), "request failed");
                Self {
                    status: 500,
                    message: SERVER_ERROR.to_owned(),
                }
            }
        }
    }

    fn from_result(result: Result<String, ControllerError>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(error) => Self::from_error(&error),
        }
    }
}

/// Joins the messages of `error` and its sources, skipping sources whose message is
/// already included by the wrapping error.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(e) = source {
        let text = e.to_string();
        if !message.ends_with(&text) {
            let _ = write!(message, ": {text}");
        }
        source = e.source();
    }
    message
}

#[derive(Debug, Clone)]
pub struct Controller {
    config: ServiceConfig,
    store: ModelStore,
}

impl Controller {
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        let store = ModelStore::new(config.models_dir.clone());
        Self { config, store }
    }

    #[must_use]
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Predicts the outcome label of `board_state` with the saved model `model_number`.
    pub fn get_prediction(
        &self,
        board_state: &str,
        model_number: &str,
    ) -> Result<String, ControllerError> {
        validator::validate_board_state(board_state)?;
        let variant = validator::validate_model_number(model_number)?;
        let row = prediction::handle_user_input(board_state, variant).map_err(ServerError::from)?;
        let model = self.store.load(variant).map_err(ServerError::from)?;
        let label = prediction::evaluate_prediction(&model, &row).map_err(ServerError::from)?;
        tracing::info!(board_state, %variant, label = %label, "predicted outcome");
        Ok(label)
    }

    /// Trains model `model_number` and saves it, replacing any previous file.
    pub fn train_model(&self, model_number: &str) -> Result<(), ControllerError> {
        let variant = validator::validate_model_number(model_number)?;
        let model = training::train(&self.config, variant).map_err(ServerError::from)?;
        fs::create_dir_all(self.store.dir()).map_err(ServerError::ModelDir)?;
        self.store.save(&model, variant).map_err(ServerError::from)?;
        Ok(())
    }

    /// Evaluates the saved model `model_number` on the test partition.
    pub fn test_model(&self, model_number: &str) -> Result<String, ControllerError> {
        let variant = validator::validate_model_number(model_number)?;
        let model = self.store.load(variant).map_err(ServerError::from)?;
        let features = training::import_dataset(&self.config, variant, Partition::Test)
            .map_err(ServerError::from)?;
        let report = training::test(&model, &features).map_err(ServerError::from)?;
        Ok(report.to_string())
    }

    #[must_use]
    pub fn predict_response(&self, board_state: &str, model_number: &str) -> Response {
        Response::from_result(self.get_prediction(board_state, model_number))
    }

    #[must_use]
    pub fn train_response(&self, model_number: &str) -> Response {
        Response::from_result(self.train_model(model_number).map(|()| TRAINED.to_owned()))
    }

    #[must_use]
    pub fn test_response(&self, model_number: &str) -> Response {
        Response::from_result(self.test_model(model_number))
    }
}
