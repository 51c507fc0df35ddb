use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the tsb binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tsb",
    version,
    about = "Generate structural declaration bindings from nominal type modules"
)]
pub struct CliArgs {
    /// Modules to convert, by name (`<modules-dir>/<name>.json`).
    #[arg(required = true)]
    pub modules: Vec<String>,

    /// Directory holding one JSON description per module.
    #[arg(short = 'd', long = "modules-dir", alias = "modulesDir")]
    pub modules_dir: PathBuf,

    /// Path to a tsb.json configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Write `<module>.d.ts` files here instead of printing to stdout.
    #[arg(short = 'o', long = "out-dir", alias = "outDir")]
    pub out_dir: Option<PathBuf>,

    /// Write the JSON run summary to this file.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Fail when more warnings than this are reported.
    #[arg(long = "max-warnings", alias = "maxWarnings")]
    pub max_warnings: Option<usize>,

    /// Fail when any of these codes is reported (`TSB6002` or `6002`).
    #[arg(long, value_delimiter = ',')]
    pub deny: Vec<String>,

    /// Also report informational diagnostics.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Disable colored diagnostics.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod tests;
