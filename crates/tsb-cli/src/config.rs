//! `tsb.json` configuration.
//!
//! ```json
//! {
//!   "excludeNamespaces": ["Internal"],
//!   "renameTypes": { "Ns.Box`1": "Container" },
//!   "excludeMembers": ["Ns.Widget::Dispose"],
//!   "naming": { "method": "camelCase", "property": "CamelCase" },
//!   "severity": { "TSB6002": "error", "3004": "warning" }
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use tsb_common::{DiagnosticPolicy, NameTransform, Severity, parse_code};
use tsb_solver::{EngineOptions, NamingPolicy};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TsbConfig {
    #[serde(default)]
    pub exclude_namespaces: Vec<String>,
    #[serde(default)]
    pub rename_types: FxHashMap<String, String>,
    #[serde(default)]
    pub exclude_members: Vec<String>,
    #[serde(default)]
    pub naming: NamingConfig,
    /// Diagnostic code → `info` | `warning` | `error`.
    #[serde(default)]
    pub severity: FxHashMap<String, String>,
}

/// One selector per symbol category; omitted selectors keep source names.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NamingConfig {
    #[serde(default)]
    pub namespace: NameTransform,
    #[serde(default)]
    pub class: NameTransform,
    #[serde(default)]
    pub interface: NameTransform,
    #[serde(default)]
    pub method: NameTransform,
    #[serde(default)]
    pub property: NameTransform,
    #[serde(default)]
    pub enum_member: NameTransform,
    #[serde(default)]
    pub generic_parameter: NameTransform,
    #[serde(default)]
    pub binding: NameTransform,
}

impl From<NamingConfig> for NamingPolicy {
    fn from(config: NamingConfig) -> Self {
        Self {
            namespace: config.namespace,
            class: config.class,
            interface: config.interface,
            method: config.method,
            property: config.property,
            enum_member: config.enum_member,
            generic_parameter: config.generic_parameter,
            binding: config.binding,
        }
    }
}

impl TsbConfig {
    /// Resolve into engine options. Unknown codes and severities are errors.
    pub fn into_options(self) -> Result<EngineOptions> {
        let mut policy = DiagnosticPolicy::new();
        let mut overrides: Vec<_> = self.severity.into_iter().collect();
        overrides.sort();
        for (code, severity) in overrides {
            let parsed = parse_code(&code).ok_or_else(|| anyhow!("unknown diagnostic code '{code}'"))?;
            let severity: Severity = severity
                .parse()
                .map_err(|message: String| anyhow!(message))
                .with_context(|| format!("invalid severity for '{code}'"))?;
            policy.set_override(parsed, severity);
        }

        let mut renames: Vec<_> = self.rename_types.into_iter().collect();
        renames.sort();
        let mut options = renames.into_iter().fold(
            EngineOptions::new()
                .with_naming(self.naming.into())
                .with_policy(policy),
            |options, (full_name, emitted)| options.rename_type(full_name, emitted),
        );
        options.exclude_namespaces = self.exclude_namespaces;
        options.exclude_members = self.exclude_members;
        Ok(options)
    }
}

pub fn parse_config(source: &str) -> Result<TsbConfig> {
    serde_json::from_str(source).context("failed to parse tsb config")
}

pub fn load_config(path: &Path) -> Result<TsbConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = parse_config(&source).with_context(|| format!("in {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
