use std::path::PathBuf;

use noughts_forest::ParamGrid;
use serde::{Deserialize, Serialize};

use crate::generators;

/// Settings shared by every service call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Labeled board dataset (CSV).
    pub dataset_path: PathBuf,
    /// Directory holding one model file per variant.
    pub models_dir: PathBuf,
    /// Seed for the train/test split, resampling and forest construction.
    pub seed: u64,
    /// Share of the dataset used for training; the rest is the test partition.
    pub train_fraction: f64,
    pub cv_folds: usize,
    pub param_grid: ParamGrid,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("ml-ttt-data.csv"),
            models_dir: PathBuf::from("models"),
            seed: 0,
            train_fraction: 0.25,
            cv_folds: 5,
            param_grid: generators::param_grid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{ "models_dir": "/tmp/m", "seed": 7 }"#).unwrap();
        assert_eq!(config.models_dir, PathBuf::from("/tmp/m"));
        assert_eq!(config.seed, 7);
        assert_eq!(config.dataset_path, PathBuf::from("ml-ttt-data.csv"));
        assert_eq!(config.cv_folds, 5);
        assert_eq!(config.param_grid, generators::param_grid());
    }
}
