//! Stager CLI: compile staging requests and translate task completions.

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is not provided.
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(
    name = "stager",
    version,
    about = "Compile application staging requests into execution-engine task recipes"
)]
struct Cli {
    #[command(subcommand)]
    command: stager::cli::Commands,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    // stdout carries command output; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = stager::cli::dispatch(cli.command).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
