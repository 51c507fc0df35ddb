//! Naming & View Resolver
//!
//! Assigns final emitted names within each scope, decides what happens when
//! two members want the same name, generates view interfaces for demoted
//! interface members, elides redundant property redeclarations, and drops
//! anything that reaches finalization unnamed.

use crate::catalog::{Ancestor, Ancestry};
use crate::diagnostics::cite_member;
use crate::error::ConvertError;
use crate::mapper::TypeMapper;
use crate::members::{Candidate, Shape, capture_from_ancestor, interface_members, shape};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};
use tsb_common::{diagnostic_codes as dc, limits, sanitize_identifier};
use tsb_model::{EmitScope, Provenance, SourceType, Symbol, SymbolKind, TypeReference};

/// Outcome of offering a candidate to a scope.
enum Placement {
    Free,
    Duplicate,
    /// Index of the member holding the name.
    Conflict(usize),
}

/// Names reserved in one emission scope.
#[derive(Default)]
struct ScopeTable {
    placed: Vec<(Symbol, Shape)>,
    /// Interface each placed member was sourced from, parallel to `placed`.
    sources: Vec<Option<String>>,
}

impl ScopeTable {
    fn classify(&self, name: &str, symbol: &Symbol, candidate: &Shape) -> Placement {
        for (index, (rival, rival_shape)) in self.placed.iter().enumerate() {
            if rival.emitted_name() != Some(name) || rival.is_static() != symbol.is_static() {
                continue;
            }
            if rival_shape == candidate {
                return Placement::Duplicate;
            }
            let both_callable = rival.kind() == symbol.kind()
                && matches!(symbol.kind(), SymbolKind::Method | SymbolKind::Constructor);
            if both_callable && rival_shape.parameters != candidate.parameters {
                continue;
            }
            if symbol.provenance() == Provenance::SynthesizedForCompatibility
                && rival.kind() == SymbolKind::Method
            {
                continue;
            }
            return Placement::Conflict(index);
        }
        Placement::Free
    }

    fn is_taken(&self, name: &str, is_static: bool) -> bool {
        self.placed
            .iter()
            .any(|(s, _)| s.emitted_name() == Some(name) && s.is_static() == is_static)
    }

    /// `name2`, `name3`…
    fn free_name(&self, base: &str, is_static: bool) -> String {
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}{suffix}");
            if suffix >= limits::MAX_NAME_SUFFIX || !self.is_taken(&candidate, is_static) {
                return candidate;
            }
            suffix += 1;
        }
    }

    fn place(&mut self, symbol: Symbol, shape: Shape) {
        self.place_from(symbol, shape, None);
    }

    fn place_from(&mut self, symbol: Symbol, shape: Shape, interface: Option<String>) {
        self.placed.push((symbol, shape));
        self.sources.push(interface);
    }

    /// Remove every member placed from `interface`.
    fn withdraw(&mut self, interface: &str) {
        let (placed, sources) = std::mem::take(&mut self.placed)
            .into_iter()
            .zip(std::mem::take(&mut self.sources))
            .filter(|(_, source)| source.as_deref() != Some(interface))
            .unzip();
        self.placed = placed;
        self.sources = sources;
    }

    /// Members in placement order; unnamed ones are reported and dropped.
    fn finalize(self, mapper: &mut TypeMapper<'_, '_>) -> Vec<Symbol> {
        let mut out = Vec::with_capacity(self.placed.len());
        for (symbol, _) in self.placed {
            match symbol.emitted_name() {
                Some(name) if !name.is_empty() => out.push(symbol),
                _ => mapper.report_member(dc::UNNAMED_SYMBOL_DROPPED, &[&cite_member(&symbol)], &symbol),
            }
        }
        out
    }
}

/// Transformed and sanitized name of a candidate; `None` when it has no
/// source name. Sanitation of declared names is reported.
fn candidate_name(mapper: &mut TypeMapper<'_, '_>, symbol: &Symbol) -> Option<String> {
    let naming = mapper.options().naming;
    let kind = symbol.kind();
    if kind == SymbolKind::Constructor {
        return Some("constructor".to_string());
    }
    let source = symbol.source_name();
    if source.is_empty() {
        return None;
    }
    let transform = match kind {
        SymbolKind::Method => naming.method,
        SymbolKind::Constructor | SymbolKind::Field | SymbolKind::Property | SymbolKind::Event => {
            naming.property
        }
    };
    let sanitized = sanitize_identifier(&transform.apply(source), false);
    if sanitized.changed && symbol.provenance() == Provenance::Declared {
        mapper.report_member(dc::IDENTIFIER_SANITIZED, &[source, &sanitized.text], symbol);
    }
    Some(sanitized.text)
}

/// Name members of a scope without views: duplicates are dropped and any
/// other collision is renamed with a numeric suffix.
pub fn resolve_scope(
    mapper: &mut TypeMapper<'_, '_>,
    owner: &str,
    candidates: Vec<Candidate>,
) -> Vec<Symbol> {
    let mut table = ScopeTable::default();
    for candidate in candidates {
        let symbol = candidate.symbol;
        let candidate_shape = shape(mapper, &symbol);
        let Some(name) = candidate_name(mapper, &symbol) else {
            table.place(symbol, candidate_shape);
            continue;
        };
        match table.classify(&name, &symbol, &candidate_shape) {
            Placement::Free => table.place(symbol.with_emitted_name(name), candidate_shape),
            Placement::Duplicate => trace!(member = %symbol.id(), "dropping duplicate"),
            Placement::Conflict(_) => {
                let renamed = table.free_name(&name, symbol.is_static());
                mapper.report_member(dc::MEMBER_RENAMED, &[&cite_member(&symbol), &renamed, owner], &symbol);
                table.place(symbol.with_emitted_name(renamed), candidate_shape);
            }
        }
    }
    table.finalize(mapper)
}

/// A generated view of one demoted interface.
#[derive(Debug)]
pub struct ViewPlan {
    pub interface: TypeReference,
    /// Declaration name of the view interface.
    pub name: String,
    /// Accessor property on the class surface.
    pub accessor: String,
    pub members: Vec<Symbol>,
}

#[derive(Debug, Default)]
pub struct SurfacePlan {
    pub members: Vec<Symbol>,
    pub views: Vec<ViewPlan>,
}

impl SurfacePlan {
    pub fn is_demoted(&self, full_name: &str) -> bool {
        self.views
            .iter()
            .any(|v| v.interface.full_name() == Some(full_name))
    }
}

/// Resolve the surface of a class. `candidates` arrive in processing order
/// (declared with their compatibility overloads, inherited, interface
/// sourced); `statics` follow them.
pub fn resolve_class_surface(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    ancestry: &Ancestry<'_>,
    class_name: &str,
    candidates: Vec<Candidate>,
    statics: Vec<Candidate>,
) -> Result<SurfacePlan, ConvertError> {
    let mut table = ScopeTable::default();
    // Demoted interface full name → (reference, view name).
    let mut demoted: IndexMap<String, (TypeReference, String)> = IndexMap::new();

    for candidate in candidates.into_iter().chain(statics) {
        let interface_name = candidate
            .interface
            .as_ref()
            .and_then(|i| i.full_name())
            .map(str::to_string);
        if interface_name.as_ref().is_some_and(|n| demoted.contains_key(n)) {
            continue;
        }
        let symbol = candidate.symbol;
        let candidate_shape = shape(mapper, &symbol);
        let Some(name) = candidate_name(mapper, &symbol) else {
            table.place(symbol, candidate_shape);
            continue;
        };
        let winner = match table.classify(&name, &symbol, &candidate_shape) {
            Placement::Free => {
                let source = match symbol.provenance() {
                    Provenance::InterfaceSourced => interface_name,
                    _ => None,
                };
                table.place_from(symbol.with_emitted_name(name), candidate_shape, source);
                continue;
            }
            Placement::Duplicate => {
                trace!(member = %symbol.id(), "dropping duplicate");
                continue;
            }
            Placement::Conflict(index) => cite_member(&table.placed[index].0),
        };
        mapper.report_member(
            dc::MEMBER_NAME_CONFLICT,
            &[&cite_member(&symbol), &winner, &ty.full_name],
            &symbol,
        );

        match (candidate.interface, interface_name) {
            (Some(interface), Some(interface_name)) if symbol.provenance() == Provenance::InterfaceSourced => {
                let flat = mapper.flatten_name(&interface);
                let desired = format!("{class_name}_As_{flat}");
                let namespace = mapper.namespace().to_string();
                let view = mapper.pass().reserve_name(&namespace, &desired, &ty.full_name);
                mapper.report_member(
                    dc::MEMBER_DEMOTED_TO_VIEW,
                    &[&cite_member(&symbol), &ty.full_name, &view],
                    &symbol,
                );
                debug!(class = %ty.full_name, interface = %interface_name, view = %view, "demoting interface to view");
                table.withdraw(&interface_name);
                demoted.insert(interface_name, (interface, view));
            }
            _ => {
                let renamed = table.free_name(&name, symbol.is_static());
                mapper.report_member(
                    dc::MEMBER_RENAMED,
                    &[&cite_member(&symbol), &renamed, &ty.full_name],
                    &symbol,
                );
                table.place(symbol.with_emitted_name(renamed), candidate_shape);
            }
        }
    }

    let mut views = Vec::with_capacity(demoted.len());
    for (interface_name, (interface, view)) in demoted {
        let flat = mapper.flatten_name(&interface);
        let mut accessor = format!("As_{flat}");
        if table.is_taken(&accessor, false) {
            accessor = table.free_name(&accessor, false);
        }
        let members = view_members(mapper, ty, ancestry, &interface_name, &interface, &view)?;
        views.push(ViewPlan {
            interface,
            name: view,
            accessor,
            members,
        });
    }

    Ok(SurfacePlan {
        members: table.finalize(mapper),
        views,
    })
}

/// Every member of the demoted interface and of the interfaces it extends,
/// in the class's terms, re-keyed on the view.
fn view_members(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    ancestry: &Ancestry<'_>,
    interface_name: &str,
    interface: &TypeReference,
    view: &str,
) -> Result<Vec<Symbol>, ConvertError> {
    let naming = mapper.options().naming;
    let view_full_name = if ty.namespace.is_empty() {
        view.to_string()
    } else {
        format!("{}.{view}", ty.namespace)
    };

    let mut sources: Vec<&Ancestor<'_>> = ancestry.interface(interface_name).into_iter().collect();
    for parent in mapper.catalog().interface_closure(interface) {
        if let Some(ancestor) = ancestry.interface(&parent) {
            sources.push(ancestor);
        }
    }

    let mut candidates = Vec::new();
    for source in sources {
        for member in interface_members(mapper, source) {
            let symbol = capture_from_ancestor(ty, source, member, Provenance::InterfaceSourced, &naming)?;
            let id = symbol.id().rehomed(&ty.module, &view_full_name);
            let symbol = symbol
                .with_id(id)
                .with_scope(EmitScope::View(interface.clone()));
            candidates.push(Candidate {
                symbol,
                interface: Some(interface.clone()),
            });
        }
    }
    Ok(resolve_scope(mapper, &view_full_name, candidates))
}

/// Drop properties that redeclare an ancestor property with an identical
/// mapped type. Ancestors are those that contribute members by inheritance
/// in the target: the emitted base class and beyond for classes, extended
/// interfaces for interfaces.
pub fn elide_redundant_properties(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    ancestry: &Ancestry<'_>,
    candidates: Vec<Candidate>,
) -> Result<Vec<Candidate>, ConvertError> {
    let naming = mapper.options().naming;
    let flattened = ancestry.flattened_bases().len();
    let contributing: Vec<&Ancestor<'_>> = if ty.kind.is_interface_like() {
        ancestry.interfaces.iter().filter(|i| i.emitted).collect()
    } else {
        ancestry.bases[flattened..].iter().collect()
    };
    if contributing.is_empty() {
        return Ok(candidates);
    }

    let mut out = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let Symbol::Property(property) = &candidate.symbol else {
            out.push(candidate);
            continue;
        };
        if candidate.symbol.is_static() {
            out.push(candidate);
            continue;
        }
        let own = shape(mapper, &candidate.symbol);
        let mut redundant_with = None;
        'search: for ancestor in &contributing {
            for member in &ancestor.ty.members {
                if member.kind != SymbolKind::Property
                    || member.name != property.core.source_name
                    || member.index_parameters.len() != property.index_parameters.len()
                    || !member.visibility.is_emitted()
                {
                    continue;
                }
                let inherited = capture_from_ancestor(ty, ancestor, member, Provenance::Inherited, &naming)?;
                if shape(mapper, &inherited) == own {
                    redundant_with = Some(format!("{}::{}", ancestor.full_name(), member.name));
                    break 'search;
                }
            }
        }
        match redundant_with {
            Some(ancestor_member) => mapper.report_member(
                dc::REDUNDANT_PROPERTY_ELIDED,
                &[&cite_member(&candidate.symbol), &ancestor_member],
                &candidate.symbol,
            ),
            None => out.push(candidate),
        }
    }
    Ok(out)
}

/// Report members an interface inherits under one name with different
/// shapes from different parents, unless the interface redeclares the name.
pub fn report_interface_conflicts(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    ancestry: &Ancestry<'_>,
    declared: &[Candidate],
) -> Result<(), ConvertError> {
    let naming = mapper.options().naming;
    let redeclared: FxHashSet<&str> = declared.iter().map(|c| c.symbol.source_name()).collect();
    let mut first_seen: IndexMap<String, (String, Shape)> = IndexMap::new();
    let mut reported: FxHashSet<String> = FxHashSet::default();

    for parent in &ancestry.interfaces {
        for member in interface_members(mapper, parent) {
            if redeclared.contains(member.name.as_str()) || reported.contains(&member.name) {
                continue;
            }
            let symbol = capture_from_ancestor(ty, parent, member, Provenance::Inherited, &naming)?;
            let member_shape = shape(mapper, &symbol);
            match first_seen.get(&member.name) {
                None => {
                    first_seen.insert(member.name.clone(), (parent.full_name().to_string(), member_shape));
                }
                Some((first_parent, first_shape)) => {
                    let callable_overload = member_shape.kind == first_shape.kind
                        && member_shape.kind == SymbolKind::Method
                        && member_shape.parameters != first_shape.parameters;
                    if *first_shape != member_shape && !callable_overload && first_parent != parent.full_name() {
                        let first_parent = first_parent.clone();
                        mapper.report(
                            dc::INTERFACE_MEMBER_CONFLICT,
                            &[&ty.full_name, &member.name, &first_parent, parent.full_name()],
                        );
                        reported.insert(member.name.clone());
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/naming_tests.rs"]
mod tests;
