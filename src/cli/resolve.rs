use clap::Parser;
use poreconfig::export::overrides_to_df;
use poreconfig::{config_to_df, write_df_to_file, BuildRequest, ConfigHandle, DataFrameFileType};
use std::path::PathBuf;
use tracing::{debug, info, trace};

use super::CliResult;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Named preset applied before the override flags
    #[arg(short, long)]
    preset: Option<String>,

    /// Write the flattened configuration table to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output file type
    #[arg(short = 't', long = "output-format", value_enum, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,

    /// Also write the effective overrides to `<output>-overrides`
    #[arg(long)]
    with_overrides: bool,

    /// Override flags after `--`, e.g. `-- --scale 0.5 --pores-all 200`
    #[arg(last = true, allow_hyphen_values = true)]
    directives: Vec<String>,
}

pub(crate) fn run(args: &Args) -> CliResult<()> {
    trace!("{args:?}");

    let request = BuildRequest::from_flags(args.preset.as_deref(), &args.directives)?;
    debug!(
        "Resolving {} explicit directive(s) over preset {}",
        request.directives.len(),
        request.preset.as_deref().unwrap_or("<none>")
    );

    let handle = ConfigHandle::default();
    let config = handle.apply(&request)?;
    println!("{config}");

    if let Some(output) = &args.output {
        let mut df = config_to_df(&config)?;
        let written = write_df_to_file(&mut df, output, args.output_format)?;
        info!("Configuration table written to {}", written.display());

        if args.with_overrides {
            let res = handle.builder().resolve(&request)?;
            let mut df = overrides_to_df(&res)?;
            let stem = output
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "poreconfig".to_string());
            let target = output.with_file_name(format!("{stem}-overrides"));
            let written = write_df_to_file(&mut df, &target, args.output_format)?;
            info!("Effective overrides written to {}", written.display());
        }
    }
    Ok(())
}
