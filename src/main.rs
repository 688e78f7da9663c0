mod cli;

use clap::{Parser, Subcommand};
use tracing::{error, Level};

/// Derive pore-structure model configurations from presets and override flags
#[derive(Parser, Debug)]
#[command(name = "poreconfig", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity of the program:
    /// -v for info, -vv for debug, and -vvv for trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a configuration from an optional preset and override flags
    Resolve(cli::resolve::Args),

    /// List every configurable parameter with its default and range
    Params(cli::params::Args),

    /// List the built-in presets and their directives
    Presets(cli::presets::Args),
}

fn main() -> cli::CliResult<()> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let result = match &args.command {
        Commands::Resolve(args) => cli::resolve::run(args),
        Commands::Params(args) => cli::params::run(args),
        Commands::Presets(args) => cli::presets::run(args),
    };
    if let Err(e) = &result {
        error!("{e}");
    }
    result
}
