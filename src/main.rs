use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stackwatch::commands::{classify, replay};
use stackwatch::logging::init_tracing;
use stackwatch::models::Intent;

#[derive(Parser)]
#[command(name = "stackwatch")]
#[command(about = "Watch an infrastructure stack deployment until it settles", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor a recorded deployment from a replay script
    Replay {
        /// Path to the YAML replay script
        script: PathBuf,

        /// Stack name (defaults to stack_name in the script)
        #[arg(short, long)]
        stack: Option<String>,

        /// Operation that was issued: create, update, delete, import
        #[arg(short, long)]
        intent: Option<Intent>,

        /// Poll interval in milliseconds
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,

        /// Give up after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Attempts per API call before giving up
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Configuration file (defaults to ./stackwatch.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a stack status is classified
    Classify {
        /// Status string, e.g. ROLLBACK_COMPLETE
        status: String,

        /// Operation that was issued: create, update, delete, import
        #[arg(short, long, default_value = "create")]
        intent: Intent,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Replay {
            script,
            stack,
            intent,
            interval_ms,
            timeout,
            max_attempts,
            config,
            json,
        } => replay::execute(replay::ReplayOptions {
            script,
            stack,
            intent,
            interval_ms,
            timeout_secs: timeout,
            max_attempts,
            config,
            json,
        }),
        Commands::Classify { status, intent } => classify::execute(status, intent),
    }
}
