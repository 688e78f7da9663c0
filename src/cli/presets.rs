use clap::Parser;
use poreconfig::PresetBook;
use tracing::trace;

use super::CliResult;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Show only this preset
    name: Option<String>,
}

pub(crate) fn run(args: &Args) -> CliResult<()> {
    trace!("{args:?}");
    let book = PresetBook::builtin();

    let presets = match &args.name {
        Some(name) => vec![book.get(name)?],
        None => book.presets().iter().collect(),
    };
    for preset in presets {
        println!("{}: {}", preset.name, preset.description);
        for (parameter, raw) in &preset.entries {
            println!("    --{parameter} {raw}");
        }
    }
    Ok(())
}
