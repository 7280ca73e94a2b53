use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use noughts_service::{Controller, ServiceConfig};

use self::{
    generate_dataset::GenerateDatasetArg,
    request::{PredictArg, TestArg, TrainArg},
};
use crate::util;

mod generate_dataset;
mod request;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(flatten)]
    global: ConfigArg,
    /// What to do
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Default, Debug, Clone, clap::Args)]
struct ConfigArg {
    /// JSON service configuration; flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Labeled board dataset (CSV)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Directory holding the trained model files
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,
    /// Seed for splitting, resampling and training
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl ConfigArg {
    fn load(&self) -> anyhow::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(dataset) = &self.dataset {
            config.dataset_path.clone_from(dataset);
        }
        if let Some(models_dir) = &self.models_dir {
            config.models_dir.clone_from(models_dir);
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Predict the outcome of a board with a trained model
    Predict(#[clap(flatten)] PredictArg),
    /// Train a model variant and save it
    Train(#[clap(flatten)] TrainArg),
    /// Evaluate a saved model on the test partition
    Test(#[clap(flatten)] TestArg),
    /// Write the labeled dataset of every board
    GenerateDataset(#[clap(flatten)] GenerateDatasetArg),
}

pub fn run() -> anyhow::Result<ExitCode> {
    let args = CommandArgs::parse();
    let config = args.global.load()?;
    tracing::debug!(?config, "loaded configuration");
    match args.mode {
        Mode::Predict(arg) => request::run_predict(&Controller::new(config), &arg),
        Mode::Train(arg) => request::run_train(&Controller::new(config), &arg),
        Mode::Test(arg) => request::run_test(&Controller::new(config), &arg),
        Mode::GenerateDataset(arg) => generate_dataset::run(&config, &arg),
    }
}
