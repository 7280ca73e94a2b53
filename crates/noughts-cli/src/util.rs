use std::{
    fs::File,
    io::{self, BufReader, Write as _},
    path::Path,
    process::ExitCode,
};

use anyhow::Context;
use noughts_service::{Response, ServiceConfig};

/// Prints `response` as JSON on stdout and maps its status onto the exit code.
pub(crate) fn print_response(response: &Response) -> anyhow::Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, response)
        .context("Failed to write response to stdout")?;
    writeln!(stdout).context("Failed to write response to stdout")?;
    Ok(if response.status == 200 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub(crate) fn read_config(path: &Path) -> anyhow::Result<ServiceConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file: {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
