//! eventboard CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use eventboard_core::init_tracing;

use eventboard_client::cli::{Cli, Command};
use eventboard_client::commands;
use eventboard_client::error::ClientResult;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(hint) = e.hint() {
                eprintln!("hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    init_tracing(cli.tracing_config())?;

    let config = cli.settings.runner_config();

    match cli.subcommand() {
        Command::Run => commands::run::run(&config).await,
        Command::Auth { force } => commands::auth::run(&config, force).await,
        Command::Render { output } => commands::render::run(&config, output.as_deref()).await,
        Command::Events => commands::events::run(&config).await,
    }
}
