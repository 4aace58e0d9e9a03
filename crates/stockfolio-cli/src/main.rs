mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::Envelope;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    match run(&cli, &cancel).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli, cancel: &CancellationToken) -> Result<ExitCode, CliError> {
    let started = Instant::now();
    let result = commands::run(cli, cancel).await?;
    if cancel.is_cancelled() {
        return Err(CliError::Interrupted);
    }

    let envelope = Envelope::new(cli.command.name(), &result, started.elapsed());
    output::render(&envelope, cli.pretty)?;

    if !result.errors.is_empty() {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("interrupt received, cancelling pending requests");
            cancel.cancel();
        }
        Err(error) => warn!(%error, "failed to install Ctrl+C handler"),
    }
}
