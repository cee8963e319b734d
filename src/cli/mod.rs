use crate::errors::{AppError, AppResult};
use clap::{Parser, Subcommand};

pub mod commands;

/// Pegged asset circulating supply aggregator
#[derive(Parser)]
#[command(name = "pegged-supply")]
#[command(about = "Aggregate and reconcile pegged asset supply across chains")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Collect, reconcile and print circulating supply for one adapter
    Run(commands::run::RunCommand),
    /// Validate adapter files without network access
    Validate(commands::validate::ValidateCommand),
    /// Test EVM RPC connectivity for a chain
    CheckRpc(commands::check_rpc::CheckRpcCommand),
}

pub async fn run() -> AppResult<()> {
    // Uses RUST_LOG environment variable (defaults to "warn" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(command) => command.run().await,
        Commands::Validate(command) => command.run(),
        Commands::CheckRpc(command) => command.run().await,
    }
}

/// Banner printed above an error that ends the process
///
/// A lone source failure (e.g. from `check-rpc`) is worded differently from
/// errors that invalidate a whole run.
pub fn error_banner(err: &AppError) -> String {
    let heading = if err.is_fatal() {
        "------ ERROR ------"
    } else {
        "------ SOURCE FAILURE ------"
    };
    format!("\n{}\n\n{}", heading, err)
}
