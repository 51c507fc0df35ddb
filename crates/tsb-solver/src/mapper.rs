//! Type Mapper
//!
//! Converts [`TypeReference`]s into target type text. The mapper is the only
//! place that decides how a reference is spelled: primitive aliases, generic
//! argument lists, nested-name flattening, namespace and module
//! qualification, and the placeholder used to break recursive expansion.
//!
//! Rendering has side effects on the module pass (dependency registration,
//! diagnostics, reference usage). [`TypeMapper::probe`] renders the same
//! text without any of them, for comparisons.

use crate::catalog::{Ownership, TypeCatalog};
use crate::dependencies::{DependencyTracker, Registration};
use crate::options::EngineOptions;
use crate::pass::ModulePass;
use crate::primitives::{
    MapSite, NULLABLE, is_inexpressible_constraint, is_numeric_fallback, is_task, primitive_alias,
};
use crate::recursion::RecursionResult;
use tracing::trace;
use tsb_common::{diagnostic_codes as dc, sanitize_identifier};
use tsb_model::types::{NESTED_SEPARATOR, arity_of, strip_arity};
use tsb_model::{
    GenericParameterDecl, NamedType, ScopeKey, SourceKind, SpecialConstraints, Symbol, TypeReference,
};

/// Result of flattening a source full name into a declaration identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatName {
    pub name: String,
    /// Name before sanitation, when sanitation changed it.
    pub unsanitized: Option<String>,
    /// Configured rename that was not a valid identifier.
    pub invalid_rename: Option<String>,
}

/// `Ns.Outer`1+Inner`2` → `Outer_1_Inner_2`, then the configured rename or
/// the class/interface transform, then sanitation.
pub fn flatten_full_name(options: &EngineOptions, full_name: &str, kind: Option<SourceKind>) -> FlatName {
    if let Some(rename) = options.type_renames.get(full_name) {
        let sanitized = sanitize_identifier(rename, true);
        return FlatName {
            invalid_rename: sanitized.changed.then(|| rename.clone()),
            name: sanitized.text,
            unsanitized: None,
        };
    }

    let mut segments = full_name.split(NESTED_SEPARATOR);
    let outermost = segments.next().unwrap_or(full_name);
    let outermost = outermost.rsplit('.').next().unwrap_or(outermost);
    let flat = std::iter::once(outermost)
        .chain(segments)
        .map(|segment| {
            let arity = arity_of(segment);
            let base = strip_arity(segment);
            if arity > 0 {
                format!("{base}_{arity}")
            } else {
                base.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("_");

    let transform = match kind {
        Some(kind) if kind.is_interface_like() => options.naming.interface,
        _ => options.naming.class,
    };
    let transformed = transform.apply(&flat);
    let sanitized = sanitize_identifier(&transformed, true);
    FlatName {
        unsanitized: sanitized.changed.then_some(transformed),
        name: sanitized.text,
        invalid_rename: None,
    }
}

/// `System.Collections.Generic` with each segment transformed and sanitized.
pub fn namespace_emitted_name(options: &EngineOptions, namespace: &str) -> String {
    if namespace.is_empty() {
        return String::new();
    }
    namespace
        .split('.')
        .map(|segment| sanitize_identifier(&options.naming.namespace.apply(segment), true).text)
        .collect::<Vec<_>>()
        .join(".")
}

pub struct TypeMapper<'a, 'c> {
    catalog: &'a TypeCatalog<'c>,
    options: &'a EngineOptions,
    pass: &'a mut ModulePass,
    /// Source namespace of the declaration being rendered.
    namespace: String,
    /// Full name of the type being converted; self references are not usage.
    owner: String,
    probe: bool,
    exempt: bool,
}

impl<'a, 'c> TypeMapper<'a, 'c> {
    pub fn new(
        catalog: &'a TypeCatalog<'c>,
        options: &'a EngineOptions,
        pass: &'a mut ModulePass,
        namespace: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            options,
            pass,
            namespace: namespace.into(),
            owner: owner.into(),
            probe: false,
            exempt: false,
        }
    }

    pub fn catalog(&self) -> &'a TypeCatalog<'c> {
        self.catalog
    }

    pub fn options(&self) -> &'a EngineOptions {
        self.options
    }

    pub fn pass(&mut self) -> &mut ModulePass {
        self.pass
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_probing(&self) -> bool {
        self.probe
    }

    /// Report through the pass unless probing.
    pub fn report(&mut self, code: u32, args: &[&str]) {
        if self.probe {
            return;
        }
        let context = self.pass.sink.context().with_type(self.owner.clone());
        self.pass.sink.report(code, args, context);
    }

    /// Report a finding about one member, with its stable id and scope.
    pub fn report_member(&mut self, code: u32, args: &[&str], symbol: &Symbol) {
        if self.probe {
            return;
        }
        let context = self
            .pass
            .sink
            .context()
            .with_type(self.owner.clone())
            .with_stable_id(symbol.id())
            .with_scope(&ScopeKey::for_member(&self.owner, symbol.scope()));
        self.pass.sink.report(code, args, context);
    }

    pub fn map(&mut self, reference: &TypeReference) -> String {
        self.map_at(reference, MapSite::Value)
    }

    /// Render without recording dependencies, diagnostics or usage.
    pub fn probe(&mut self, reference: &TypeReference) -> String {
        let previous = std::mem::replace(&mut self.probe, true);
        let text = self.map(reference);
        self.probe = previous;
        text
    }

    /// Render a reference that does not count as a use of the referenced
    /// type itself (interface `extends` clauses, alias constituents). Type
    /// arguments are still recorded.
    pub fn map_exempt(&mut self, reference: &TypeReference) -> String {
        self.exempt = true;
        let text = self.map(reference);
        self.exempt = false;
        text
    }

    pub fn map_at(&mut self, reference: &TypeReference, site: MapSite) -> String {
        match reference {
            TypeReference::Named(named) => self.map_named(named, reference, site),
            TypeReference::Nested(nested) => match nested.full.as_ref() {
                TypeReference::Named(named) => self.map_named(named, reference, site),
                other => self.map_at(other, site),
            },
            TypeReference::GenericParameter(p) => self.type_parameter_name(&p.name),
            TypeReference::Array { element, rank } => {
                let element_text = self.map_at(element, MapSite::Numeric);
                let element_text = if element_text.contains(" | ") {
                    format!("({element_text})")
                } else {
                    element_text
                };
                if *rank > 1 {
                    self.report(
                        dc::MULTIDIMENSIONAL_ARRAY,
                        &[&rank.to_string(), &element.to_string()],
                    );
                }
                let mut text = element_text;
                for _ in 0..*rank {
                    text.push_str("[]");
                }
                text
            }
            TypeReference::Pointer { pointee, depth } => {
                let mut text = self.map_at(pointee, MapSite::Numeric);
                for _ in 0..*depth {
                    text = format!("ptr<{text}>");
                }
                text
            }
            TypeReference::ByRef { referenced } => {
                format!("ref<{}>", self.map_at(referenced, site))
            }
            TypeReference::Placeholder { debug_name } => {
                self.report(dc::PLACEHOLDER_EMITTED, &[debug_name, "any"]);
                "any".to_string()
            }
        }
    }

    fn map_named(&mut self, named: &NamedType, whole: &TypeReference, site: MapSite) -> String {
        let exempt = std::mem::take(&mut self.exempt);
        let full_name = named.full_name.as_str();

        if let Some(alias) = primitive_alias(full_name) {
            return alias.to_string();
        }
        if is_numeric_fallback(full_name) {
            let fallback = site.numeric_fallback();
            self.report(dc::NUMERIC_FALLBACK, &[full_name, fallback]);
            return fallback.to_string();
        }
        if is_task(full_name) {
            return match named.type_arguments.first() {
                Some(result) => format!("Future<{}>", self.map(result)),
                None => "Future<void>".to_string(),
            };
        }
        if full_name == NULLABLE {
            if let Some(inner) = named.type_arguments.first() {
                return format!("{} | null", self.map_at(inner, site));
            }
        }

        // Arguments are part of the key: `List<List<int>>` renders its inner
        // `List` while the outer one is still in progress.
        let key = if named.type_arguments.is_empty() {
            whole.stable_key()
        } else {
            format!("{}|{whole}", whole.stable_key())
        };
        match self.pass.guard.enter(key.clone()) {
            RecursionResult::Entered => {}
            denied => {
                trace!(key = %key, ?denied, "breaking recursive reference");
                self.report(dc::PLACEHOLDER_EMITTED, &[&whole.to_string(), "any"]);
                return "any".to_string();
            }
        }
        let text = self.render_named(named, exempt);
        self.pass.guard.leave(&key);
        text
    }

    fn render_named(&mut self, named: &NamedType, exempt: bool) -> String {
        let catalog = self.catalog;
        let full_name = named.full_name.as_str();
        let (qualified, declared) = match catalog.resolve_owner(&named.module, full_name) {
            Ownership::Cycle { module } => {
                self.report(dc::FORWARDING_CYCLE, &[full_name, &module]);
                self.report(dc::PLACEHOLDER_EMITTED, &[full_name, "any"]);
                return "any".to_string();
            }
            Ownership::Local(ty) => {
                if !catalog.is_local_emitted(&ty.full_name) {
                    return "any".to_string();
                }
                if !self.probe && !exempt && ty.full_name != self.owner {
                    self.pass.record_usage(&ty.full_name);
                }
                let name = match self.pass.declaration_name(&ty.full_name) {
                    Some(name) => name.to_string(),
                    None => flatten_full_name(self.options, &ty.full_name, Some(ty.kind)).name,
                };
                let qualified = if ty.namespace == self.namespace || ty.namespace.is_empty() {
                    name
                } else {
                    format!("{}.{name}", namespace_emitted_name(self.options, &ty.namespace))
                };
                (qualified, Some(ty))
            }
            Ownership::Foreign { module, ty } => {
                let alias = self.register_dependency(&module, full_name);
                let kind = ty.map(|t| t.kind);
                let name = flatten_full_name(self.options, full_name, kind).name;
                let namespace = ty.map(|t| t.namespace.clone()).unwrap_or_else(|| named.namespace.clone());
                let qualified = if namespace.is_empty() {
                    format!("{alias}.{name}")
                } else {
                    format!("{alias}.{}.{name}", namespace_emitted_name(self.options, &namespace))
                };
                (qualified, ty)
            }
        };

        let declared_arity = declared.map_or(named.arity as usize, |t| t.generic_parameters.len());
        let arguments: Vec<String> = if named.type_arguments.is_empty() {
            match declared {
                Some(ty) if !ty.generic_parameters.is_empty() => ty
                    .generic_parameters
                    .iter()
                    .map(|p| self.type_parameter_name(&p.name))
                    .collect(),
                _ => (1..=named.arity).map(|i| format!("T{i}")).collect(),
            }
        } else {
            if declared.is_some() && named.type_arguments.len() != declared_arity {
                self.report(
                    dc::GENERIC_ARITY_MISMATCH,
                    &[
                        full_name,
                        &named.type_arguments.len().to_string(),
                        &declared_arity.to_string(),
                    ],
                );
            }
            named.type_arguments.iter().map(|a| self.map(a)).collect()
        };

        if arguments.is_empty() {
            qualified
        } else {
            format!("{qualified}<{}>", arguments.join(", "))
        }
    }

    fn register_dependency(&mut self, module: &str, full_name: &str) -> String {
        if self.probe {
            return self.pass.dependencies.peek_alias(module);
        }
        match self.pass.dependencies.record(module, full_name) {
            Registration::Existing => self
                .pass
                .dependencies
                .alias_of(module)
                .map(str::to_string)
                .unwrap_or_else(|| DependencyTracker::natural_alias(module)),
            Registration::New { alias, displaced } => {
                self.report(dc::DEPENDENCY_REGISTERED, &[module, &alias]);
                if let Some((natural, holder)) = displaced {
                    self.report(dc::MODULE_ALIAS_DISAMBIGUATED, &[&natural, module, &holder, &alias]);
                }
                alias
            }
        }
    }

    /// Qualified name of a named reference as seen from `current_module`,
    /// without type arguments.
    pub fn qualify(&mut self, reference: &TypeReference, current_module: &str) -> String {
        let Some(named) = reference.as_named() else {
            return self.map(reference);
        };
        let bare = NamedType::new(named.module.clone(), named.full_name.clone());
        let text = if current_module == self.catalog.module() {
            self.render_named(&bare, true)
        } else {
            let name = flatten_full_name(self.options, &named.full_name, self.catalog.kind_of(reference)).name;
            match namespace_emitted_name(self.options, &named.namespace) {
                ns if ns.is_empty() => name,
                ns => format!("{ns}.{name}"),
            }
        };
        match text.find('<') {
            Some(idx) => text[..idx].to_string(),
            None => text,
        }
    }

    /// Declaration identifier of a named reference (`Box_1`, `Outer_Inner`).
    pub fn flatten_name(&self, reference: &TypeReference) -> String {
        let Some(full_name) = reference.full_name() else {
            return sanitize_identifier(&reference.to_string(), true).text;
        };
        if let Some(name) = self.pass.declaration_name(full_name) {
            return name.to_string();
        }
        flatten_full_name(self.options, full_name, self.catalog.kind_of(reference)).name
    }

    pub fn type_parameter_name(&self, name: &str) -> String {
        sanitize_identifier(&self.options.naming.generic_parameter.apply(name), true).text
    }

    /// `T extends C1 & C2`. Constraints without a structural counterpart
    /// are dropped and reported.
    pub fn render_type_parameter(&mut self, decl: &GenericParameterDecl) -> String {
        let name = self.type_parameter_name(&decl.name);
        for (flag, label) in [
            (SpecialConstraints::VALUE_TYPE, "struct"),
            (SpecialConstraints::UNMANAGED, "unmanaged"),
            (SpecialConstraints::DEFAULT_CONSTRUCTOR, "new()"),
        ] {
            if decl.special.contains(flag) {
                self.report(dc::CONSTRAINT_DROPPED, &[label, &decl.name]);
            }
        }
        let mut constraints = Vec::new();
        for constraint in &decl.constraints {
            if constraint.full_name().is_some_and(is_inexpressible_constraint) {
                let label = if constraint.full_name() == Some("System.Enum") {
                    "enum".to_string()
                } else {
                    constraint.to_string()
                };
                self.report(dc::CONSTRAINT_DROPPED, &[&label, &decl.name]);
                continue;
            }
            constraints.push(self.map(constraint));
        }
        if constraints.is_empty() {
            name
        } else {
            format!("{name} extends {}", constraints.join(" & "))
        }
    }
}

#[cfg(test)]
#[path = "tests/mapper_tests.rs"]
mod tests;
