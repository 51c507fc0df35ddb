//! Type catalog: the module being processed plus cross-module lookups.
//!
//! The catalog knows which types this module emits, follows type forwarding
//! to the real owner of a reference, and walks base-class and interface
//! ancestry with the heritage type arguments substituted.

use crate::diagnostics::DiagnosticSink;
use crate::options::EngineOptions;
use crate::primitives::is_implicit_base;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};
use tsb_common::diagnostic_codes as dc;
use tsb_model::{
    ForwardOutcome, LoadedModule, ModuleLoader, SourceKind, SourceType, Substitution,
    TypeReference,
};

/// Who owns a referenced type once forwarding is followed.
#[derive(Debug)]
pub enum Ownership<'c> {
    /// Declared or forwarded-and-loaded by the module being processed.
    Local(&'c SourceType),
    Foreign {
        module: String,
        ty: Option<&'c SourceType>,
    },
    /// The forwarding chain loops; `module` is where the loop was detected.
    Cycle { module: String },
}

impl<'c> Ownership<'c> {
    pub fn source(&self) -> Option<&'c SourceType> {
        match self {
            Self::Local(ty) => Some(ty),
            Self::Foreign { ty, .. } => *ty,
            Self::Cycle { .. } => None,
        }
    }
}

/// One ancestor of a type, with heritage arguments in the descendant's terms.
#[derive(Clone, Debug)]
pub struct Ancestor<'c> {
    pub ty: &'c SourceType,
    pub reference: TypeReference,
    /// The ancestor gets its own declaration (this module or its owner's).
    pub emitted: bool,
    /// Part of the descendant's own heritage, declared or through a
    /// flattened base.
    pub direct: bool,
}

impl Ancestor<'_> {
    /// Rewrite a reference taken from the ancestor's members into the
    /// descendant's terms.
    pub fn substitute(&self, reference: &TypeReference) -> TypeReference {
        match Substitution::for_reference(&self.reference) {
            Some(subst) => reference.substitute(&subst),
            None => reference.clone(),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.ty.full_name
    }
}

/// Base chain and transitive interface set of one type.
#[derive(Debug, Default)]
pub struct Ancestry<'c> {
    /// Nearest base first.
    pub bases: Vec<Ancestor<'c>>,
    /// Transitive interfaces in first-seen (preorder) order.
    pub interfaces: Vec<Ancestor<'c>>,
    /// Interfaces implemented through the emitted base class.
    pub inherited_interfaces: FxHashSet<String>,
}

impl<'c> Ancestry<'c> {
    /// Bases whose members are flattened because they are not emitted.
    pub fn flattened_bases(&self) -> &[Ancestor<'c>] {
        let end = self
            .bases
            .iter()
            .position(|b| b.emitted)
            .unwrap_or(self.bases.len());
        &self.bases[..end]
    }

    pub fn emitted_base(&self) -> Option<&Ancestor<'c>> {
        self.bases.iter().find(|b| b.emitted)
    }

    pub fn interface(&self, full_name: &str) -> Option<&Ancestor<'c>> {
        self.interfaces.iter().find(|i| i.full_name() == full_name)
    }
}

pub struct TypeCatalog<'c> {
    loader: &'c dyn ModuleLoader,
    module: String,
    /// Every type this module declares or loaded through forwarding.
    local: IndexMap<String, SourceType>,
    /// Subset of `local` that gets a declaration.
    emitted: FxHashSet<String>,
    /// Forwarded entries of this module: full name → target module.
    forwarded: FxHashMap<String, String>,
    options: &'c EngineOptions,
}

impl<'c> TypeCatalog<'c> {
    pub fn build(
        loader: &'c dyn ModuleLoader,
        loaded: LoadedModule,
        options: &'c EngineOptions,
        sink: &mut DiagnosticSink,
    ) -> Self {
        let module = loaded.name.clone();
        let mut local: IndexMap<String, SourceType> = IndexMap::new();
        let mut forwarded = FxHashMap::default();

        let mut admit = |ty: SourceType, sink: &mut DiagnosticSink| {
            if local.contains_key(&ty.full_name) {
                sink.report(
                    dc::DUPLICATE_TYPE,
                    &[&ty.full_name, &module],
                    sink.context().with_type(ty.full_name.clone()),
                );
                return;
            }
            local.insert(ty.full_name.clone(), ty);
        };

        for ty in loaded.types {
            admit(ty.normalized(&module), sink);
        }
        for entry in loaded.forwarded {
            forwarded.insert(entry.full_name.clone(), entry.target_module.clone());
            match entry.outcome {
                ForwardOutcome::Loaded(ty) => admit(ty.normalized(&entry.target_module), sink),
                ForwardOutcome::Failed(reason) => sink.report(
                    dc::FORWARDED_TYPE_LOAD_FAILED,
                    &[&entry.full_name, &module, &reason],
                    sink.context().with_type(entry.full_name.clone()),
                ),
            }
        }

        let mut emitted = FxHashSet::default();
        let mut excluded_namespaces = IndexSet::new();
        for ty in local.values() {
            if !ty.visibility.is_emitted() {
                trace!(ty = %ty.full_name, "skipping non-public type");
                continue;
            }
            if options.is_namespace_excluded(&ty.namespace) {
                excluded_namespaces.insert(ty.namespace.clone());
                continue;
            }
            emitted.insert(ty.full_name.clone());
        }
        excluded_namespaces.sort();
        for ns in excluded_namespaces {
            sink.report(dc::NAMESPACE_EXCLUDED, &[&ns], sink.context());
        }

        debug!(module = %module, types = local.len(), emitted = emitted.len(), "catalog built");
        Self {
            loader,
            module,
            local,
            emitted,
            forwarded,
            options,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Emitted types sorted by namespace, then type name.
    pub fn emitted_types(&self) -> Vec<&SourceType> {
        let mut types: Vec<&SourceType> = self
            .local
            .values()
            .filter(|t| self.emitted.contains(&t.full_name))
            .collect();
        types.sort_by(|a, b| {
            (a.namespace.as_str(), a.name.as_str(), a.full_name.as_str()).cmp(&(
                b.namespace.as_str(),
                b.name.as_str(),
                b.full_name.as_str(),
            ))
        });
        types
    }

    pub fn is_local_emitted(&self, full_name: &str) -> bool {
        self.emitted.contains(full_name)
    }

    fn local_type(&self, module: &str, full_name: &str) -> Option<&SourceType> {
        self.local
            .get(full_name)
            .filter(|t| module == self.module || t.module == module)
    }

    /// Follow forwarding from `(module, full_name)` to the owning module.
    pub fn resolve_owner(&self, module: &str, full_name: &str) -> Ownership<'_> {
        if let Some(ty) = self.local_type(module, full_name) {
            return Ownership::Local(ty);
        }

        let mut guard: RecursionGuard<String> =
            RecursionGuard::with_profile(RecursionProfile::Forwarding);
        let mut current = module.to_string();
        let ownership = loop {
            if current != self.module {
                if let Some(ty) = self.loader.find_type(&current, full_name) {
                    break Ownership::Foreign {
                        module: current,
                        ty: Some(ty),
                    };
                }
            }
            let next = if current == self.module {
                self.forwarded.get(full_name).cloned()
            } else {
                self.loader
                    .forwarded_to(&current, full_name)
                    .map(str::to_string)
            };
            let Some(next) = next else {
                break Ownership::Foreign {
                    module: current,
                    ty: None,
                };
            };
            if guard.enter(current.clone()).is_denied() {
                break Ownership::Cycle { module: current };
            }
            trace!(ty = full_name, from = %current, to = %next, "following forward");
            if next == self.module {
                if let Some(ty) = self.local.get(full_name) {
                    break Ownership::Local(ty);
                }
            }
            current = next;
        };
        guard.reset();
        ownership
    }

    pub fn resolve(&self, reference: &TypeReference) -> Option<&SourceType> {
        let named = reference.as_named()?;
        self.resolve_owner(&named.module, &named.full_name).source()
    }

    pub fn kind_of(&self, reference: &TypeReference) -> Option<SourceKind> {
        self.resolve(reference).map(|t| t.kind)
    }

    /// Whether a resolved type gets a declaration somewhere.
    pub fn is_emitted(&self, ty: &SourceType) -> bool {
        if self.local.get(&ty.full_name).is_some_and(|t| std::ptr::eq(t, ty)) {
            return self.emitted.contains(&ty.full_name);
        }
        ty.visibility.is_emitted() && !self.options.is_namespace_excluded(&ty.namespace)
    }

    /// Walk the base chain and the transitive interface set of `ty`.
    ///
    /// Unresolved ancestors are reported and treated as leaves; inheritance
    /// cycles are reported and cut.
    pub fn ancestry<'a>(&'a self, ty: &'a SourceType, sink: &mut DiagnosticSink) -> Ancestry<'a> {
        let mut ancestry = Ancestry::default();
        let mut guard: RecursionGuard<String> =
            RecursionGuard::with_profile(RecursionProfile::AncestorWalk);

        // Base chain.
        let _ = guard.enter(ty.full_name.clone());
        let mut current: Option<Ancestor<'a>> = None;
        let mut base_ref = ty.base.clone();
        while let Some(reference) = base_ref.take() {
            let Some(full_name) = reference.full_name().map(str::to_string) else {
                break;
            };
            if is_implicit_base(&full_name) {
                break;
            }
            let reference = match &current {
                Some(child) => child.substitute(&reference),
                None => reference,
            };
            let Some(base) = self.resolve(&reference) else {
                sink.report(
                    dc::UNRESOLVED_BASE_TYPE,
                    &[&full_name, &ty.full_name],
                    sink.context()
                        .with_type(ty.full_name.clone())
                        .with_reference(&reference),
                );
                break;
            };
            if guard.enter(base.full_name.clone()) != RecursionResult::Entered {
                sink.report(
                    dc::INHERITANCE_CYCLE,
                    &[&ty.full_name, &base.full_name],
                    sink.context().with_type(ty.full_name.clone()),
                );
                break;
            }
            let ancestor = Ancestor {
                ty: base,
                reference,
                emitted: self.is_emitted(base),
                direct: current.is_none(),
            };
            base_ref = base.base.clone();
            ancestry.bases.push(ancestor.clone());
            current = Some(ancestor);
        }
        guard.reset();

        // Interfaces: the type's own, then those of flattened bases.
        let mut seen: FxHashSet<String> = FxHashSet::default();
        seen.insert(ty.full_name.clone());
        let _ = guard.enter(ty.full_name.clone());
        for iface in &ty.interfaces {
            self.visit_interface(ty, iface.clone(), true, &mut seen, &mut guard, &mut ancestry.interfaces, sink);
        }
        let flattened = ancestry.flattened_bases().len();
        for base in ancestry.bases[..flattened].to_vec() {
            for iface in &base.ty.interfaces {
                let reference = base.substitute(iface);
                self.visit_interface(ty, reference, true, &mut seen, &mut guard, &mut ancestry.interfaces, sink);
            }
        }
        guard.reset();

        // Everything reachable through the emitted base is already implemented there.
        for base in &ancestry.bases[flattened..] {
            for iface in &base.ty.interfaces {
                if let Some(full_name) = iface.full_name() {
                    ancestry.inherited_interfaces.insert(full_name.to_string());
                    for name in self.interface_closure(iface) {
                        ancestry.inherited_interfaces.insert(name);
                    }
                }
            }
        }

        ancestry
    }

    fn visit_interface<'a>(
        &'a self,
        root: &SourceType,
        reference: TypeReference,
        direct: bool,
        seen: &mut FxHashSet<String>,
        guard: &mut RecursionGuard<String>,
        out: &mut Vec<Ancestor<'a>>,
        sink: &mut DiagnosticSink,
    ) {
        let Some(full_name) = reference.full_name().map(str::to_string) else {
            return;
        };
        if guard.is_visiting(&full_name) {
            sink.report(
                dc::INHERITANCE_CYCLE,
                &[&root.full_name, &full_name],
                sink.context().with_type(root.full_name.clone()),
            );
            return;
        }
        if !seen.insert(full_name.clone()) {
            return;
        }
        let Some(iface) = self.resolve(&reference) else {
            sink.report(
                dc::UNRESOLVED_INTERFACE,
                &[&full_name, &root.full_name],
                sink.context()
                    .with_type(root.full_name.clone())
                    .with_reference(&reference),
            );
            return;
        };
        if guard.enter(full_name.clone()).is_denied() {
            return;
        }
        let ancestor = Ancestor {
            ty: iface,
            reference,
            emitted: self.is_emitted(iface),
            direct,
        };
        out.push(ancestor.clone());
        for parent in &iface.interfaces {
            let parent = ancestor.substitute(parent);
            self.visit_interface(root, parent, false, seen, guard, out, sink);
        }
        guard.leave(&full_name);
    }

    /// Full names of every interface `reference` transitively extends,
    /// itself excluded. Silent: unresolved ancestors and cycles just stop
    /// the walk.
    pub fn interface_closure(&self, reference: &TypeReference) -> IndexSet<String> {
        let mut out = IndexSet::new();
        let mut stack: Vec<TypeReference> = Vec::new();
        if let Some(ty) = self.resolve(reference) {
            stack.extend(ty.interfaces.iter().rev().cloned());
        }
        let root = reference.full_name().unwrap_or_default().to_string();
        while let Some(next) = stack.pop() {
            let Some(full_name) = next.full_name().map(str::to_string) else {
                continue;
            };
            if full_name == root || !out.insert(full_name) {
                continue;
            }
            if out.len() as u32 > tsb_common::limits::MAX_ANCESTOR_DEPTH * 8 {
                break;
            }
            if let Some(ty) = self.resolve(&next) {
                stack.extend(ty.interfaces.iter().rev().cloned());
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
