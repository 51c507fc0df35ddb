use crate::data::{DIAGNOSTIC_MESSAGES, diagnostic_codes as dc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix used when rendering a numeric code (`TSB3004`).
pub const CODE_PREFIX: &str = "TSB";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" | "message" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "invalid severity '{other}'. Expected info, warning or error"
            )),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub message: &'static str,
}

impl DiagnosticMessage {
    pub const fn new(code: u32, message: &'static str) -> Self {
        Self { code, message }
    }
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    DIAGNOSTIC_MESSAGES
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

pub fn format_code(code: u32) -> String {
    format!("{CODE_PREFIX}{code}")
}

/// Parse `TSB3004` (or a bare `3004`) back into a numeric code.
pub fn parse_code(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix(CODE_PREFIX)
        .or_else(|| trimmed.strip_prefix(&CODE_PREFIX.to_ascii_lowercase()))
        .unwrap_or(trimmed);
    let code = digits.parse().ok()?;
    get_message_template(code).map(|_| code)
}

/// Assigns severities to codes.
///
/// The default table reports benign, expected resolutions as `Info` and
/// everything else as `Warning`. Callers layer per-code overrides on top.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticPolicy {
    overrides: FxHashMap<u32, Severity>,
}

impl DiagnosticPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, code: u32, severity: Severity) -> Self {
        self.overrides.insert(code, severity);
        self
    }

    pub fn set_override(&mut self, code: u32, severity: Severity) {
        self.overrides.insert(code, severity);
    }

    pub fn severity_for(&self, code: u32) -> Severity {
        self.overrides
            .get(&code)
            .copied()
            .unwrap_or_else(|| Self::default_severity(code))
    }

    fn default_severity(code: u32) -> Severity {
        match code {
            dc::DIAMOND_RESOLVED
            | dc::OVERLOAD_SYNTHESIZED
            | dc::REDUNDANT_PROPERTY_ELIDED
            | dc::NAMESPACE_EXCLUDED
            | dc::MEMBER_EXCLUDED
            | dc::DEPENDENCY_REGISTERED
            | dc::STATIC_MEMBER_LIFTED => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod tests;
