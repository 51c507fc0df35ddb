//! Per-module pass state.
//!
//! Everything stateful during one module's conversion lives here: the
//! diagnostics sink, the dependency tracker, the mapper's in-progress set,
//! reserved declaration names, queued intersection aliases and the reference
//! usage that decides diamond bases. A pass is created per module and
//! dropped before the next one starts.

use crate::dependencies::DependencyTracker;
use crate::diagnostics::DiagnosticSink;
use crate::recursion::{RecursionGuard, RecursionProfile};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use tracing::trace;
use tsb_common::{DiagnosticPolicy, diagnostic_codes as dc, limits};
use tsb_model::IntersectionAlias;

pub struct ModulePass {
    pub sink: DiagnosticSink,
    pub dependencies: DependencyTracker,
    /// In-progress set of the type mapper, keyed by stable key.
    pub guard: RecursionGuard<String>,
    /// Source full name → reserved declaration name.
    declaration_names: FxHashMap<String, String>,
    /// Namespace → names taken in it.
    taken: FxHashMap<String, FxHashSet<String>>,
    /// Namespace → alias key → alias.
    pending_aliases: FxHashMap<String, BTreeMap<Vec<String>, IntersectionAlias>>,
    /// Local types referenced outside interface heritage and alias constituents.
    usage: FxHashSet<String>,
    diamond_candidates: IndexSet<String>,
}

impl ModulePass {
    pub fn new(module: &str, policy: DiagnosticPolicy) -> Self {
        Self {
            sink: DiagnosticSink::new(module, policy),
            dependencies: DependencyTracker::new(),
            guard: RecursionGuard::with_profile(RecursionProfile::TypeMapping),
            declaration_names: FxHashMap::default(),
            taken: FxHashMap::default(),
            pending_aliases: FxHashMap::default(),
            usage: FxHashSet::default(),
            diamond_candidates: IndexSet::new(),
        }
    }

    /// Clear per-type state before the next type is converted.
    pub fn begin_type(&mut self) {
        self.guard.reset();
    }

    /// Reserve `desired` in `namespace`, suffixing `_2`, `_3`… on collision.
    /// `source` names what the reservation is for in the collision report.
    pub fn reserve_name(&mut self, namespace: &str, desired: &str, source: &str) -> String {
        let taken = self.taken.entry(namespace.to_string()).or_default();
        if taken.insert(desired.to_string()) {
            return desired.to_string();
        }
        let mut suffix = 2;
        let name = loop {
            let candidate = format!("{desired}_{suffix}");
            if suffix >= limits::MAX_NAME_SUFFIX || !taken.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        taken.insert(name.clone());
        let context = self.sink.context().with_type(source.to_string());
        self.sink.report(
            dc::DECLARATION_NAME_COLLISION,
            &[desired, namespace, source, &name],
            context,
        );
        name
    }

    /// Reserve the declaration name of a source type.
    pub fn reserve_declaration(&mut self, namespace: &str, full_name: &str, desired: &str) -> String {
        if let Some(existing) = self.declaration_names.get(full_name) {
            return existing.clone();
        }
        let name = self.reserve_name(namespace, desired, full_name);
        trace!(ty = full_name, name = %name, "reserved declaration name");
        self.declaration_names
            .insert(full_name.to_string(), name.clone());
        name
    }

    pub fn declaration_name(&self, full_name: &str) -> Option<&str> {
        self.declaration_names.get(full_name).map(String::as_str)
    }

    pub fn is_name_taken(&self, namespace: &str, name: &str) -> bool {
        self.taken
            .get(namespace)
            .is_some_and(|names| names.contains(name))
    }

    pub fn pending_alias(&self, namespace: &str, key: &[String]) -> Option<&IntersectionAlias> {
        self.pending_aliases.get(namespace)?.get(key)
    }

    /// Queue an alias for late insertion. Aliases with an existing key are
    /// the same alias: the queued one is kept.
    pub fn queue_alias(&mut self, namespace: &str, alias: IntersectionAlias) {
        self.pending_aliases
            .entry(namespace.to_string())
            .or_default()
            .entry(alias.key.clone())
            .or_insert(alias);
    }

    /// Queued aliases of `namespace`, in key order.
    pub fn take_aliases(&mut self, namespace: &str) -> Vec<IntersectionAlias> {
        self.pending_aliases
            .remove(namespace)
            .map(|aliases| aliases.into_values().collect())
            .unwrap_or_default()
    }

    pub fn record_usage(&mut self, full_name: &str) {
        if !self.usage.contains(full_name) {
            self.usage.insert(full_name.to_string());
        }
    }

    pub fn is_used(&self, full_name: &str) -> bool {
        self.usage.contains(full_name)
    }

    pub fn add_diamond_candidate(&mut self, full_name: &str) {
        self.diamond_candidates.insert(full_name.to_string());
    }

    pub fn diamond_candidates(&self) -> impl Iterator<Item = &str> {
        self.diamond_candidates.iter().map(String::as_str)
    }
}
