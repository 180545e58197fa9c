use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tally_core::inventory::RecordId;

mod commands;
mod context;
mod logging;
mod render;

use context::AppContext;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally - scan barcodes into a persistent inventory", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep the inventory in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read barcodes from standard input into the inventory
    Scan,
    /// List recorded scans, newest first
    List,
    /// Delete a single record
    Delete {
        /// Record id as shown by `list`
        id: RecordId,
    },
    /// Delete every record
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write the inventory to a dated CSV file
    Export {
        /// Target directory (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    // A stdin read still parked on the blocking pool must not keep the process alive.
    runtime.shutdown_background();

    result
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let context = AppContext::load(cli.config.as_deref(), cli.ephemeral)?;
    let _log_guard = logging::init(context.log_dir()?.as_deref());
    tracing::debug!(config = %context.config_path().display(), "Configuration loaded");

    match cli.command {
        Commands::Scan => return commands::scan::run(&context).await,
        Commands::List => commands::list::run(&context)?,
        Commands::Delete { id } => commands::delete::run(&context, id)?,
        Commands::Clear { yes } => commands::clear::run(&context, yes)?,
        Commands::Export { output } => commands::export::run(&context, output)?,
    }

    Ok(ExitCode::SUCCESS)
}
