//! folio: portfolio profile loader.
//!
//! # Usage
//!
//! ```text
//! folio check [CONFIG] [--public-repos N]
//! folio load [CONFIG] [--json]
//! folio watch [CONFIG]
//! ```
//!
//! Global flags: `--api-base URL` (env `FOLIO_API_BASE`), `--log-json`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, load::LoadArgs, watch::WatchArgs};
use folio_fetch::DEFAULT_API_BASE;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    version,
    about = "Load a portfolio profile and its repositories from the GitHub API",
    long_about = None,
)]
struct Cli {
    /// Base URL of the platform API.
    #[arg(long, global = true, env = "FOLIO_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a config file and show the requests a load would issue.
    Check(CheckArgs),

    /// Run one load cycle and render the result.
    Load(LoadArgs),

    /// Reload whenever the config file changes, until ctrl-c.
    Watch(WatchArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    folio_runtime::init_tracing(cli.log_json);
    match cli.command {
        Commands::Check(args) => args.run(&cli.api_base),
        Commands::Load(args) => args.run(&cli.api_base),
        Commands::Watch(args) => args.run(&cli.api_base),
    }
}
