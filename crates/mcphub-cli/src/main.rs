//! CLI entry point - the composition root.
//!
//! Sets up logging and the environment, parses arguments, bootstraps the
//! hub and dispatches to a handler.

use std::time::Duration;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use mcphub_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout carries command output; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command()
            .print_help()
            .map_err(|e| CliError::Arguments(e.to_string()))?;
        return Ok(());
    };

    let ctx = bootstrap(&CliConfig {
        config_path: cli.config,
        request_timeout: Duration::from_secs(cli.timeout_secs),
    })?;

    match command {
        Commands::Servers => handlers::servers::execute(&ctx),
        Commands::Check => handlers::check::execute(&ctx),
        Commands::Tools { server, logs } => {
            handlers::tools::execute(&ctx, server.as_deref(), logs).await
        }
        Commands::Call { server, tool, args } => {
            handlers::call::execute(&ctx, &server, &tool, args.as_deref()).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables (MCPHUB_CONFIG, RUST_LOG)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }

    Ok(())
}
