//! Overload & Covariance Reconciler
//!
//! A method that overrides or implements an ancestor method with a narrower
//! return type leaves the target unable to see the ancestor's signature. For
//! each such pair the reconciler adds a compatibility overload carrying the
//! ancestor's exact signature right after the narrower one. Properties are
//! never split: the narrower type wins and the finding is reported.

use crate::catalog::{Ancestor, Ancestry};
use crate::diagnostics::cite_member;
use crate::error::ConvertError;
use crate::mapper::TypeMapper;
use crate::members::{Candidate, Shape, capture_from_ancestor, shape};
use smallvec::SmallVec;
use tracing::debug;
use tsb_common::diagnostic_codes as dc;
use tsb_model::{
    MemberFlags, Provenance, SourceMember, SourceType, Symbol, SymbolKind, TypeReference,
};

/// Ancestors in matching order: base chain (nearest first), then the
/// transitive interface set.
fn ancestors_in_order<'x, 'c>(ancestry: &'x Ancestry<'c>) -> impl Iterator<Item = &'x Ancestor<'c>> {
    ancestry.bases.iter().chain(ancestry.interfaces.iter())
}

fn matching_members<'t>(
    ancestor: &Ancestor<'t>,
    kind: SymbolKind,
    name: &str,
    arity: usize,
) -> SmallVec<[&'t SourceMember; 2]> {
    ancestor
        .ty
        .members
        .iter()
        .filter(|m| {
            m.kind == kind
                && m.name == name
                && !m.flags.contains(MemberFlags::STATIC)
                && m.explicit_interface.is_none()
                && match kind {
                    SymbolKind::Method => m.parameters.len() == arity,
                    _ => m.index_parameters.len() == arity,
                }
        })
        .collect()
}

/// Augment declared instance members with compatibility overloads and
/// report covariant properties.
pub fn reconcile(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    ancestry: &Ancestry<'_>,
    declared: Vec<Candidate>,
) -> Result<Vec<Candidate>, ConvertError> {
    let naming = mapper.options().naming;
    let mut out: Vec<Candidate> = Vec::with_capacity(declared.len());
    let mut shapes: Vec<(String, Shape)> = declared
        .iter()
        .map(|c| (c.symbol.source_name().to_string(), shape(mapper, &c.symbol)))
        .collect();

    for candidate in declared {
        match &candidate.symbol {
            Symbol::Method(method) if !candidate.symbol.is_static() => {
                let origin_shape = shape(mapper, &candidate.symbol);
                let mut synthesized = Vec::new();
                for ancestor in ancestors_in_order(ancestry) {
                    let name = method.core.source_name.as_str();
                    for member in matching_members(ancestor, SymbolKind::Method, name, method.parameters.len()) {
                        let alternate = capture_from_ancestor(
                            ty,
                            ancestor,
                            member,
                            Provenance::SynthesizedForCompatibility,
                            &naming,
                        )?;
                        let alternate_shape = shape(mapper, &alternate);
                        if alternate_shape.ty == origin_shape.ty {
                            continue;
                        }
                        if let Some((parameter, owner)) = unrepresentable(member, &alternate, ty, ancestor) {
                            let cited = format!("{}::{}", ancestor.full_name(), member.name);
                            mapper.report_member(
                                dc::COVARIANT_OVERLOAD_UNREPRESENTABLE,
                                &[&cited, &cite_member(&candidate.symbol), &parameter, &owner],
                                &candidate.symbol,
                            );
                            continue;
                        }
                        let exists = shapes
                            .iter()
                            .any(|(n, s)| n == name && *s == alternate_shape);
                        if exists {
                            continue;
                        }
                        let Symbol::Method(mut alternate_method) = alternate else {
                            continue;
                        };
                        alternate_method.widens = Some(method.core.id.clone());
                        alternate_method.flags = method.flags;
                        let alternate = Symbol::Method(alternate_method);
                        mapper.report_member(
                            dc::OVERLOAD_SYNTHESIZED,
                            &[&cite_member(&alternate), &cite_member(&candidate.symbol)],
                            &alternate,
                        );
                        debug!(member = %alternate.id(), "synthesized compatibility overload");
                        shapes.push((name.to_string(), alternate_shape));
                        synthesized.push(Candidate::declared(alternate));
                    }
                }
                out.push(candidate);
                out.extend(synthesized);
            }
            Symbol::Property(property) if !candidate.symbol.is_static() => {
                let own = shape(mapper, &candidate.symbol);
                let name = property.core.source_name.as_str();
                let arity = property.index_parameters.len();
                'ancestors: for ancestor in ancestors_in_order(ancestry) {
                    for member in matching_members(ancestor, SymbolKind::Property, name, arity) {
                        let inherited =
                            capture_from_ancestor(ty, ancestor, member, Provenance::Inherited, &naming)?;
                        if shape(mapper, &inherited).ty != own.ty {
                            let cited = format!("{}::{}", ancestor.full_name(), member.name);
                            mapper.report_member(
                                dc::PROPERTY_COVARIANCE_ACCEPTED,
                                &[&cite_member(&candidate.symbol), &cited],
                                &candidate.symbol,
                            );
                            break 'ancestors;
                        }
                    }
                }
                out.push(candidate);
            }
            _ => out.push(candidate),
        }
    }
    Ok(out)
}

/// A compatibility overload is unrepresentable when its signature would
/// mention a type parameter nobody declares: a parameter of the ancestor left
/// unbound by the heritage clause, or a parameter of `ty` in a position the
/// ancestor's own signature has no type parameter. Returns the offending
/// parameter and its owner.
fn unrepresentable(
    original: &SourceMember,
    alternate: &Symbol,
    ty: &SourceType,
    ancestor: &Ancestor<'_>,
) -> Option<(String, String)> {
    let Symbol::Method(alternate) = alternate else {
        return None;
    };
    let originals = original
        .parameters
        .iter()
        .map(|p| &p.ty)
        .chain(original.ty.iter());
    let alternates = alternate
        .parameters
        .iter()
        .map(|p| &p.ty)
        .chain(std::iter::once(&alternate.return_type));

    for (orig, alt) in originals.zip(alternates) {
        let mut unbound = None;
        alt.walk(&mut |r| {
            if unbound.is_none() {
                if let TypeReference::GenericParameter(p) = r {
                    if p.owner == ancestor.ty.full_name && p.owner != ty.full_name {
                        unbound = Some((p.name.clone(), p.owner.clone()));
                    }
                }
            }
        });
        if unbound.is_some() {
            return unbound;
        }
        if let Some(name) = foreign_parameter_position(orig, alt, &ty.full_name) {
            return Some((name, ty.full_name.clone()));
        }
    }
    None
}

fn foreign_parameter_position(original: &TypeReference, alternate: &TypeReference, owner: &str) -> Option<String> {
    match (original, alternate) {
        (TypeReference::GenericParameter(_), _) => None,
        (_, TypeReference::GenericParameter(p)) if p.owner == owner => Some(p.name.clone()),
        (TypeReference::Named(a), TypeReference::Named(b)) => a
            .type_arguments
            .iter()
            .zip(&b.type_arguments)
            .find_map(|(x, y)| foreign_parameter_position(x, y, owner)),
        (TypeReference::Array { element: a, .. }, TypeReference::Array { element: b, .. })
        | (TypeReference::Pointer { pointee: a, .. }, TypeReference::Pointer { pointee: b, .. })
        | (TypeReference::ByRef { referenced: a }, TypeReference::ByRef { referenced: b }) => {
            foreign_parameter_position(a, b, owner)
        }
        (TypeReference::Nested(a), TypeReference::Nested(b)) => {
            foreign_parameter_position(&a.full, &b.full, owner)
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/overloads_tests.rs"]
mod tests;
