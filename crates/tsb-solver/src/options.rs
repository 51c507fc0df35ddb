//! Engine configuration.
//!
//! Read-only policy consumed once per run. The CLI builds it from a config
//! file; tests build it directly.

use rustc_hash::FxHashMap;
use tsb_common::{DiagnosticPolicy, NameTransform};
use tsb_model::types::strip_arity;

/// One transform per symbol category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NamingPolicy {
    pub namespace: NameTransform,
    pub class: NameTransform,
    pub interface: NameTransform,
    pub method: NameTransform,
    pub property: NameTransform,
    pub enum_member: NameTransform,
    pub generic_parameter: NameTransform,
    /// Parameter (binding) names.
    pub binding: NameTransform,
}

impl NamingPolicy {
    /// Camel-case for members and bindings; declarations keep their names.
    pub fn camel_case_members() -> Self {
        Self {
            method: NameTransform::CamelCase,
            property: NameTransform::CamelCase,
            binding: NameTransform::CamelCase,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EngineOptions {
    /// Exact namespaces or dotted prefixes (`Internal` excludes `Internal.Impl`).
    pub exclude_namespaces: Vec<String>,
    /// Full type name → emitted declaration name.
    pub type_renames: FxHashMap<String, String>,
    /// `Namespace.Type::Member` entries; the arity marker may be omitted.
    pub exclude_members: Vec<String>,
    pub naming: NamingPolicy,
    pub policy: DiagnosticPolicy,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn exclude_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.exclude_namespaces.push(namespace.into());
        self
    }

    pub fn exclude_member(mut self, member: impl Into<String>) -> Self {
        self.exclude_members.push(member.into());
        self
    }

    pub fn rename_type(mut self, full_name: impl Into<String>, emitted: impl Into<String>) -> Self {
        self.type_renames.insert(full_name.into(), emitted.into());
        self
    }

    pub fn with_policy(mut self, policy: DiagnosticPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_namespace_excluded(&self, namespace: &str) -> bool {
        self.exclude_namespaces.iter().any(|excluded| {
            namespace == excluded
                || namespace
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    pub fn is_member_excluded(&self, type_full_name: &str, member: &str) -> bool {
        if self.exclude_members.is_empty() {
            return false;
        }
        let exact = format!("{type_full_name}::{member}");
        let plain = format!("{}::{member}", strip_all_arity(type_full_name));
        self.exclude_members
            .iter()
            .any(|entry| *entry == exact || *entry == plain)
    }
}

/// `Ns.Outer`1+Inner`2` → `Ns.Outer+Inner`
fn strip_all_arity(full_name: &str) -> String {
    full_name
        .split('+')
        .map(strip_arity)
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_exclusion_matches_prefix_on_segment_boundary() {
        let options = EngineOptions::new().exclude_namespace("Internal");
        assert!(options.is_namespace_excluded("Internal"));
        assert!(options.is_namespace_excluded("Internal.Impl"));
        assert!(!options.is_namespace_excluded("InternalTools"));
        assert!(!options.is_namespace_excluded("Public"));
    }

    #[test]
    fn member_exclusion_accepts_either_spelling() {
        let options = EngineOptions::new()
            .exclude_member("Ns.Box::Unwrap")
            .exclude_member("Ns.Widget::Dispose");
        assert!(options.is_member_excluded("Ns.Box`1", "Unwrap"));
        assert!(options.is_member_excluded("Ns.Widget", "Dispose"));
        assert!(!options.is_member_excluded("Ns.Widget", "Unwrap"));
    }
}
