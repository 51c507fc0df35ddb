//! Diagnostic collection for one module pass.
//!
//! Every finding is a registry code plus positional message arguments. The
//! severity is never chosen at the report site: it comes from the
//! [`DiagnosticPolicy`] the sink was created with.

use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};
use tsb_common::{DiagnosticPolicy, Severity, format_code, format_message, get_message_template};
use tsb_model::{MemberStableId, ScopeKey, Symbol, TypeReference};

/// Structured context attached to a diagnostic for tooling consumption.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticContext {
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stable_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl DiagnosticContext {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_stable_id(mut self, id: &MemberStableId) -> Self {
        self.stable_ids.push(id.to_string());
        self
    }

    pub fn with_scope(mut self, scope: &ScopeKey) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn with_reference(mut self, reference: &TypeReference) -> Self {
        self.types.push(reference.stable_key());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: u32,
    pub severity: Severity,
    pub message: String,
    pub context: DiagnosticContext,
}

impl Diagnostic {
    /// `TSB3004`
    pub fn code_text(&self) -> String {
        format_code(self.code)
    }

    pub fn is_warning_or_worse(&self) -> bool {
        self.severity >= Severity::Warning
    }
}

/// `warning TSB2001: message`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.code_text(), self.message)
    }
}

/// Accumulates diagnostics for one module, in report order.
#[derive(Debug)]
pub struct DiagnosticSink {
    module: String,
    policy: DiagnosticPolicy,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(module: impl Into<String>, policy: DiagnosticPolicy) -> Self {
        Self {
            module: module.into(),
            policy,
            diagnostics: Vec::new(),
        }
    }

    /// Fresh context for this sink's module.
    pub fn context(&self) -> DiagnosticContext {
        DiagnosticContext::new(self.module.clone())
    }

    pub fn report(&mut self, code: u32, args: &[&str], context: DiagnosticContext) {
        let message = match get_message_template(code) {
            Some(template) => format_message(template, args),
            None => format!("unregistered diagnostic {}: {}", format_code(code), args.join(", ")),
        };
        let severity = self.policy.severity_for(code);
        match severity {
            Severity::Info => debug!(code = %format_code(code), %message, "diagnostic"),
            Severity::Warning | Severity::Error => {
                warn!(code = %format_code(code), %message, "diagnostic");
            }
        }
        self.diagnostics.push(Diagnostic {
            code,
            severity,
            message,
            context,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// `Module:DeclaringType::Member(params): ReturnType`
///
/// Fields, properties and events cite their index parameters (usually none)
/// and their value type.
pub fn cite_member(symbol: &Symbol) -> String {
    let id = symbol.id();
    let (params, ret) = match symbol {
        Symbol::Constructor(s) => (
            join(s.parameters.iter().map(|p| &p.ty)),
            "System.Void".to_string(),
        ),
        Symbol::Method(s) => (join(s.parameters.iter().map(|p| &p.ty)), s.return_type.to_string()),
        Symbol::Property(s) => (join(s.index_parameters.iter().map(|p| &p.ty)), s.ty.to_string()),
        Symbol::Field(s) => (String::new(), s.ty.to_string()),
        Symbol::Event(s) => (String::new(), s.handler.to_string()),
    };
    format!(
        "{}:{}::{}({params}): {ret}",
        id.module,
        id.declaring_type,
        symbol.source_name()
    )
}

fn join<'a>(types: impl Iterator<Item = &'a TypeReference>) -> String {
    types.map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod tests;
