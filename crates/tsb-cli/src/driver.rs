//! One CLI run: load config and modules, generate, print, gate.

use anyhow::{Context, Result, bail};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use tsb_common::{format_code, parse_code};
use tsb_emitter::{DeclarationPrinter, RunSummary};
use tsb_solver::{BindingEngine, EngineOptions, ModuleOutput};

use crate::args::CliArgs;
use crate::config::load_config;
use crate::loader::JsonModuleLoader;

/// Why a run that produced output still fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateFailure {
    TooManyWarnings { count: usize, max: usize },
    Denied { code: u32, count: usize },
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyWarnings { count, max } => {
                write!(f, "{count} warnings reported; at most {max} allowed")
            }
            Self::Denied { code, count } => {
                write!(f, "{} is denied and was reported {count} time(s)", format_code(*code))
            }
        }
    }
}

pub struct RunResult {
    pub outputs: Vec<ModuleOutput>,
    /// Module name and declaration text, in argument order.
    pub declarations: Vec<(String, String)>,
    pub written: Vec<PathBuf>,
    pub summary: RunSummary,
    pub gate_failures: Vec<GateFailure>,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.gate_failures.is_empty()
    }
}

pub fn resolve_options(config: Option<&Path>) -> Result<EngineOptions> {
    match config {
        Some(path) => load_config(path)?.into_options(),
        None => Ok(EngineOptions::new()),
    }
}

pub fn parse_denied(codes: &[String]) -> Result<Vec<u32>> {
    let mut parsed = Vec::with_capacity(codes.len());
    for code in codes {
        match parse_code(code) {
            Some(code) => parsed.push(code),
            None => bail!("unknown diagnostic code '{code}' in --deny"),
        }
    }
    Ok(parsed)
}

#[instrument(level = "info", skip_all, fields(modules = args.modules.len()))]
pub fn run(args: &CliArgs) -> Result<RunResult> {
    let options = resolve_options(args.config.as_deref())?;
    let denied = parse_denied(&args.deny)?;
    let loader = JsonModuleLoader::open(&args.modules_dir)?;
    let engine = BindingEngine::new(&loader, options);
    let mut printer = DeclarationPrinter::new();

    let mut outputs = Vec::with_capacity(args.modules.len());
    let mut declarations = Vec::with_capacity(args.modules.len());
    for module in &args.modules {
        let output = engine
            .generate(module)
            .with_context(|| format!("failed to generate bindings for '{module}'"))?;
        info!(
            module = %module,
            namespaces = output.namespaces.len(),
            diagnostics = output.diagnostics.len(),
            "module generated"
        );
        declarations.push((module.clone(), printer.print(&output)));
        outputs.push(output);
    }

    let mut written = Vec::new();
    if let Some(out_dir) = &args.out_dir {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;
        for (module, text) in &declarations {
            let path = out_dir.join(format!("{module}.d.ts"));
            std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
            written.push(path);
        }
    }

    let mut summary = RunSummary::now();
    for output in &outputs {
        summary.record(output);
    }
    if let Some(path) = &args.summary {
        let json = summary.to_json().context("failed to serialize run summary")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path.clone());
    }

    let gate_failures = evaluate_gate(&outputs, &summary, args.max_warnings, &denied);
    Ok(RunResult {
        outputs,
        declarations,
        written,
        summary,
        gate_failures,
    })
}

pub fn evaluate_gate(
    outputs: &[ModuleOutput],
    summary: &RunSummary,
    max_warnings: Option<usize>,
    denied: &[u32],
) -> Vec<GateFailure> {
    let mut failures = Vec::new();
    if let Some(max) = max_warnings {
        if summary.warnings.len() > max {
            failures.push(GateFailure::TooManyWarnings {
                count: summary.warnings.len(),
                max,
            });
        }
    }
    for &code in denied {
        let count = outputs
            .iter()
            .map(|output| output.diagnostics_with_code(code).count())
            .sum();
        if count > 0 {
            failures.push(GateFailure::Denied { code, count });
        }
    }
    failures
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
