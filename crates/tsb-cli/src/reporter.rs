use colored::Colorize;
use tsb_common::Severity;
use tsb_emitter::RunSummary;
use tsb_solver::{Diagnostic, ModuleOutput};

use crate::driver::GateFailure;

pub struct Reporter {
    color: bool,
    verbose: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// One line per reported diagnostic. Informational findings are only
    /// included in verbose mode.
    pub fn render(&self, outputs: &[ModuleOutput]) -> String {
        let mut out = String::new();
        for output in outputs {
            for diagnostic in &output.diagnostics {
                if !self.verbose && !diagnostic.is_warning_or_worse() {
                    continue;
                }
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&self.format_diagnostic(&output.module, diagnostic));
            }
        }
        out
    }

    pub fn format_diagnostic(&self, module: &str, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        match &diagnostic.context.type_name {
            Some(type_name) => output.push_str(&format!("{module}:{type_name}")),
            None => output.push_str(module),
        }
        output.push_str(" - ");
        output.push_str(&self.format_severity(diagnostic.severity));
        output.push(' ');
        output.push_str(&self.format_code(&diagnostic.code_text()));
        output.push_str(": ");
        output.push_str(&diagnostic.message);
        output
    }

    pub fn format_summary(&self, summary: &RunSummary) -> String {
        let counts = &summary.counts;
        let line = format!(
            "{} module(s), {} declaration(s): {} classes, {} interfaces, {} enums, {} aliases, {} static namespaces, {} views; {} warning(s)",
            summary.modules.len(),
            counts.total(),
            counts.classes,
            counts.interfaces,
            counts.enums,
            counts.aliases,
            counts.static_namespaces,
            counts.views,
            summary.warnings.len()
        );
        if self.color && summary.warnings.is_empty() {
            line.green().to_string()
        } else {
            line
        }
    }

    pub fn format_gate_failure(&self, failure: &GateFailure) -> String {
        let text = format!("gate failed: {failure}");
        if self.color {
            text.red().bold().to_string()
        } else {
            text
        }
    }

    fn format_severity(&self, severity: Severity) -> String {
        let text = severity.to_string();
        if !self.color {
            return text;
        }
        match severity {
            Severity::Error => text.red().bold().to_string(),
            Severity::Warning => text.yellow().bold().to_string(),
            Severity::Info => text.cyan().to_string(),
        }
    }

    fn format_code(&self, code: &str) -> String {
        if self.color {
            code.dimmed().to_string()
        } else {
            code.to_string()
        }
    }
}

#[cfg(test)]
#[path = "tests/reporter_tests.rs"]
mod tests;
