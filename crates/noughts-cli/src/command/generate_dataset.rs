use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use noughts_service::{Response, ServiceConfig, dataset};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GenerateDatasetArg {
    /// Output file path [default: the configured dataset path]
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(config: &ServiceConfig, arg: &GenerateDatasetArg) -> anyhow::Result<ExitCode> {
    let path = arg.output.as_ref().unwrap_or(&config.dataset_path);
    let rows = dataset::generate_dataset(path)
        .with_context(|| format!("Failed to generate dataset: {}", path.display()))?;
    util::print_response(&Response::ok(format!(
        "Wrote {rows} boards to {}",
        path.display()
    )))
}
