//! Flock CLI - apply SQL migration scripts from a directory

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{history, migrate, status, RunArgs};

/// Exit code when a script failed
const EXIT_SCRIPT_FAILED: u8 = 1;
/// Exit code when the run could not start or the history table broke
const EXIT_RUN_ERROR: u8 = 2;

/// Flock - applies each SQL script exactly once
#[derive(Parser)]
#[command(name = "flock", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    /// Log engine activity to stderr (per statement)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every pending script
    Migrate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare scripts on disk with the migration table
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List applied scripts
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            output::say(output::Tone::Error, &format!("ERROR: {:#}", e));
            ExitCode::from(EXIT_RUN_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let service = cli.run.build_service()?;

    match cli.command {
        Commands::Migrate { json } => {
            let succeeded = migrate::run(&service, json)?;
            Ok(if succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_SCRIPT_FAILED)
            })
        }
        Commands::Status { json } => status::run(&service, json).map(|()| ExitCode::SUCCESS),
        Commands::History { json } => history::run(&service, json).map(|()| ExitCode::SUCCESS),
    }
}

/// Install the stderr log subscriber
///
/// `FLOCK_LOG` takes the usual filter syntax, e.g. `FLOCK_LOG=flock_core=debug`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "flock_core=debug" } else { "flock_core=warn" };
    let filter = EnvFilter::try_from_env("FLOCK_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
