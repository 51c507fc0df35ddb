//! Run summary written next to the declaration files.

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tsb_model::Declaration;
use tsb_solver::ModuleOutput;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCounts {
    pub classes: usize,
    pub interfaces: usize,
    pub enums: usize,
    pub aliases: usize,
    /// Static classes and companion namespaces.
    pub static_namespaces: usize,
    pub views: usize,
}

impl TypeCounts {
    fn add(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Class(class) => {
                self.classes += 1;
                self.static_namespaces += usize::from(class.companion.is_some());
            }
            Declaration::Interface(interface) => {
                if interface.view_of.is_some() {
                    self.views += 1;
                } else {
                    self.interfaces += 1;
                }
                self.static_namespaces += usize::from(interface.companion.is_some());
            }
            Declaration::Enum(_) => self.enums += 1,
            Declaration::IntersectionAlias(_) => self.aliases += 1,
            Declaration::StaticNamespace(_) => self.static_namespaces += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.classes + self.interfaces + self.enums + self.aliases + self.static_namespaces + self.views
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Unix seconds.
    pub timestamp: u64,
    pub modules: Vec<String>,
    /// Distinct source namespace names in first-seen order.
    pub namespaces: Vec<String>,
    pub counts: TypeCounts,
    /// Rendered warnings and errors (`warning TSB6002: ...`).
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            modules: Vec::new(),
            namespaces: Vec::new(),
            counts: TypeCounts::default(),
            warnings: Vec::new(),
        }
    }

    /// Summary stamped with the current time.
    pub fn now() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::new(timestamp)
    }

    pub fn record(&mut self, output: &ModuleOutput) {
        self.modules.push(output.module.clone());
        for namespace in &output.namespaces {
            if !self.namespaces.contains(&namespace.name) {
                self.namespaces.push(namespace.name.clone());
            }
            for declaration in namespace.declarations() {
                self.counts.add(declaration);
            }
        }
        self.warnings.extend(
            output
                .diagnostics
                .iter()
                .filter(|d| d.is_warning_or_worse())
                .map(ToString::to_string),
        );
    }

    pub fn from_outputs<'a>(timestamp: u64, outputs: impl IntoIterator<Item = &'a ModuleOutput>) -> Self {
        let mut summary = Self::new(timestamp);
        for output in outputs {
            summary.record(output);
        }
        summary
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[path = "tests/run_summary_tests.rs"]
mod tests;
