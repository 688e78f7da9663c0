use clap::Parser;
use poreconfig::{parameters_to_df, write_df_to_file, DataFrameFileType, Registry};
use std::path::PathBuf;
use tracing::{info, trace};

use super::CliResult;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Write the registry table to this path instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output file type
    #[arg(short = 't', long = "output-format", value_enum, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,
}

pub(crate) fn run(args: &Args) -> CliResult<()> {
    trace!("{args:?}");
    let registry = Registry::builtin();

    match &args.output {
        Some(output) => {
            let mut df = parameters_to_df(&registry)?;
            let written = write_df_to_file(&mut df, output, args.output_format)?;
            info!("Parameter registry written to {}", written.display());
        }
        None => {
            for spec in registry.specs() {
                println!(
                    "--{:<28} {:<14} default={:<12} {}",
                    spec.name,
                    spec.kind.to_string(),
                    spec.default.unwrap_or("-"),
                    spec.describe_range()
                );
            }
        }
    }
    Ok(())
}
