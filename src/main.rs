mod cli;
mod config;
mod error;
mod model;
mod normalize;
mod pipeline;
mod providers;
mod store;
mod util;

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cli::{Command, Verbosity};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = cli::parse_args(&args)?;
    init_tracing(invocation.verbosity)?;

    match invocation.command {
        Command::Help => {
            cli::print_help();
            Ok(ExitCode::SUCCESS)
        }
        Command::Fetch { label } => {
            let config = config::load_config()?;
            let response = cli::handle_fetch(&config, label).await?;
            tracing::debug!(status = response.status_code(), "fetch finished");
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::List => {
            let config = config::load_config()?;
            cli::handle_list(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { id } => {
            let config = config::load_config()?;
            cli::handle_show(&config, &id).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing(verbosity: Verbosity) -> Result<()> {
    let level = match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "info",
        Verbosity::Verbose => "debug",
    };
    let filter = EnvFilter::try_from_env("SNAPSHOT_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing subscriber: {err}"))?;
    Ok(())
}
