use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};

use tsb_cli::args::CliArgs;
use tsb_cli::driver;
use tsb_cli::reporter::Reporter;

/// Declarations were produced but a `--max-warnings` or `--deny` gate failed.
const EXIT_GATE_FAILED: i32 = 2;

fn main() -> Result<()> {
    // Only installs a subscriber when TSB_LOG or RUST_LOG is set.
    tsb_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let result = driver::run(&args)?;

    let color = !args.no_color && std::io::stderr().is_terminal();
    let reporter = Reporter::new(color).verbose(args.verbose);
    let mut stderr = std::io::stderr().lock();
    let rendered = reporter.render(&result.outputs);
    if !rendered.is_empty() {
        writeln!(stderr, "{rendered}")?;
    }
    writeln!(stderr, "{}", reporter.format_summary(&result.summary))?;
    for failure in &result.gate_failures {
        writeln!(stderr, "{}", reporter.format_gate_failure(failure))?;
    }

    if args.out_dir.is_none() {
        let mut stdout = std::io::stdout().lock();
        for (_, text) in &result.declarations {
            stdout.write_all(text.as_bytes()).context("failed to write declarations")?;
        }
        stdout.flush().context("failed to write declarations")?;
    }

    if !result.passed() {
        std::process::exit(EXIT_GATE_FAILED);
    }
    Ok(())
}
