mod app;
mod cli;
mod error;
mod render;

use std::process::ExitCode;

use clap::Parser;
use skylog_core::Config;

use crate::app::App;
use crate::cli::Cli;
use crate::error::{AppError, AppResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = skylog_core::init(filter) {
        eprintln!("{}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let (config, _) = Config::load_validated(cli.config.as_deref())
        .map_err(AppError::invalid_config)?;

    let app = App::new(config)?;
    app.run(cli.command).await
}
