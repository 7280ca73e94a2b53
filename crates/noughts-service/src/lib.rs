//! Tic-tac-toe outcome prediction service.
//!
//! Boards are read from a labeled CSV dataset, turned into numeric features by one of seven
//! recipes ([`ModelVariant`]) and used to train a random forest per recipe. Trained models are
//! stored as JSON files and answer predictions for single boards.
//!
//! # Layers
//!
//! ```text
//! Controller            (validation, {status, message} responses)
//!   ├─ validator        board strings and model numbers
//!   ├─ training         split, feature import, grid search, evaluation
//!   │    └─ recipe      per-variant pipelines of data transforms
//!   │         └─ data   one-hot/ordinal encoding, counts, resampling
//!   ├─ prediction       single-board feature rows and inference
//!   └─ file             model persistence
//! ```
//!
//! Every call re-reads the dataset or model file it needs; nothing is cached between calls.
//!
//! # Example
//!
//! ```no_run
//! use noughts_service::{Controller, ServiceConfig};
//!
//! let controller = Controller::new(ServiceConfig::default());
//! let response = controller.train_response("2");
//! assert_eq!(response.status, 200);
//! let response = controller.predict_response("xxxoobbbb", "2");
//! println!("{}", response.message);
//! ```

pub use self::{
    config::ServiceConfig,
    controller::{Controller, ControllerError, Response},
    recipe::ModelVariant,
    table::Table,
    training::TrainedModel,
};

pub mod config;
pub mod controller;
pub mod data;
pub mod dataset;
pub mod file;
pub mod generators;
pub mod prediction;
pub mod recipe;
pub mod table;
pub mod training;
pub mod validator;
