//! Member capture.
//!
//! Turns source members into [`Symbol`]s: declared members of the type being
//! converted, members flattened from bases that are not emitted, and members
//! flattened from implemented interfaces. Every captured symbol starts
//! unnamed; the naming resolver assigns emitted names later.

use crate::catalog::{Ancestor, Ancestry};
use crate::diagnostics::cite_member;
use crate::error::ConvertError;
use crate::mapper::TypeMapper;
use crate::options::NamingPolicy;
use tracing::trace;
use tsb_common::{diagnostic_codes as dc, sanitize_identifier};
use tsb_model::{
    ConstructorSymbol, EventSymbol, FieldSymbol, GenericParameterDecl, MemberDecl, MemberFlags,
    MemberStableId, MethodSymbol, Parameter, ParameterDecl, PropertySymbol, Provenance,
    SourceMember, SourceType, Substitution, Symbol, SymbolCore, SymbolKind, TypeReference,
};

/// A member on its way to a declaration.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub symbol: Symbol,
    /// Heritage reference of the interface an interface-sourced member came from.
    pub interface: Option<TypeReference>,
}

impl Candidate {
    pub fn declared(symbol: Symbol) -> Self {
        Self {
            symbol,
            interface: None,
        }
    }
}

/// Rendered comparison form of a member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    pub kind: SymbolKind,
    pub parameters: Vec<String>,
    pub ty: String,
}

pub fn shape(mapper: &mut TypeMapper<'_, '_>, symbol: &Symbol) -> Shape {
    let (parameters, ty): (Vec<&TypeReference>, Option<&TypeReference>) = match symbol {
        Symbol::Constructor(s) => (s.parameters.iter().map(|p| &p.ty).collect(), None),
        Symbol::Method(s) => (s.parameters.iter().map(|p| &p.ty).collect(), Some(&s.return_type)),
        Symbol::Property(s) => (s.index_parameters.iter().map(|p| &p.ty).collect(), Some(&s.ty)),
        Symbol::Field(s) => (Vec::new(), Some(&s.ty)),
        Symbol::Event(s) => (Vec::new(), Some(&s.handler)),
    };
    Shape {
        kind: symbol.kind(),
        parameters: parameters.into_iter().map(|p| mapper.probe(p)).collect(),
        ty: ty.map(|t| mapper.probe(t)).unwrap_or_default(),
    }
}

fn binding_name(naming: &NamingPolicy, name: &str, index: usize) -> String {
    if name.is_empty() {
        return format!("arg{index}");
    }
    sanitize_identifier(&naming.binding.apply(name), true).text
}

fn named_parameters(naming: &NamingPolicy, parameters: &[Parameter]) -> Vec<Parameter> {
    parameters
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let emitted = binding_name(naming, &p.name, i);
            p.clone().with_emitted_name(emitted)
        })
        .collect()
}

fn named_generic_parameters(naming: &NamingPolicy, parameters: &[GenericParameterDecl]) -> Vec<GenericParameterDecl> {
    parameters
        .iter()
        .map(|p| {
            let mut p = p.clone();
            p.emitted_name = Some(sanitize_identifier(&naming.generic_parameter.apply(&p.name), true).text);
            p
        })
        .collect()
}

/// Build the symbol for `member` as declared on `declaring`.
pub fn capture_member(
    module: &str,
    declaring: &str,
    member: &SourceMember,
    naming: &NamingPolicy,
) -> Result<Symbol, ConvertError> {
    let missing = || ConvertError::MissingMemberType {
        member: format!("{declaring}::{}", member.name),
    };
    let parameters = named_parameters(naming, &member.parameters);
    let core = |signature: String| {
        SymbolCore::new(
            MemberStableId::new(module, declaring, member.name.clone(), signature),
            member.name.clone(),
            member.visibility,
        )
    };

    let symbol = match member.kind {
        SymbolKind::Constructor => Symbol::Constructor(ConstructorSymbol {
            core: core(MemberStableId::constructor_signature(parameters.iter().map(|p| &p.ty))),
            parameters,
        }),
        SymbolKind::Method => {
            let return_type = member.ty.clone().ok_or_else(missing)?;
            Symbol::Method(MethodSymbol {
                core: core(MemberStableId::method_signature(
                    parameters.iter().map(|p| &p.ty),
                    &return_type,
                )),
                generic_parameters: named_generic_parameters(naming, &member.generic_parameters),
                parameters,
                return_type,
                flags: member.flags,
                widens: None,
            })
        }
        SymbolKind::Property => {
            let ty = member.ty.clone().ok_or_else(missing)?;
            let index_parameters = named_parameters(naming, &member.index_parameters);
            let mut flags = member.flags;
            if !member.has_setter {
                flags |= MemberFlags::READONLY;
            }
            Symbol::Property(PropertySymbol {
                core: core(MemberStableId::property_signature(
                    index_parameters.iter().map(|p| &p.ty),
                    &ty,
                )),
                ty,
                index_parameters,
                flags,
                has_getter: member.has_getter,
                has_setter: member.has_setter,
            })
        }
        SymbolKind::Field => {
            let ty = member.ty.clone().ok_or_else(missing)?;
            Symbol::Field(FieldSymbol {
                core: core(MemberStableId::property_signature(std::iter::empty(), &ty)),
                ty,
                flags: member.flags,
                constant: member.constant.clone(),
            })
        }
        SymbolKind::Event => {
            let handler = member.ty.clone().ok_or_else(missing)?;
            Symbol::Event(EventSymbol {
                core: core(MemberStableId::property_signature(std::iter::empty(), &handler)),
                handler,
                flags: member.flags,
            })
        }
    };
    Ok(symbol)
}

/// Copy of `member` with every reference rewritten through `subst`.
pub fn substitute_member(member: &SourceMember, subst: &Substitution) -> SourceMember {
    let rewrite = |params: &[Parameter]| -> Vec<Parameter> {
        params
            .iter()
            .map(|p| Parameter {
                ty: p.ty.substitute(subst),
                ..p.clone()
            })
            .collect()
    };
    SourceMember {
        ty: member.ty.as_ref().map(|t| t.substitute(subst)),
        parameters: rewrite(&member.parameters),
        index_parameters: rewrite(&member.index_parameters),
        generic_parameters: member
            .generic_parameters
            .iter()
            .map(|g| GenericParameterDecl {
                constraints: g.constraints.iter().map(|c| c.substitute(subst)).collect(),
                ..g.clone()
            })
            .collect(),
        ..member.clone()
    }
}

/// Capture an ancestor's member in the descendant's terms, re-keyed on the
/// descendant.
pub fn capture_from_ancestor(
    owner: &SourceType,
    ancestor: &Ancestor<'_>,
    member: &SourceMember,
    provenance: Provenance,
    naming: &NamingPolicy,
) -> Result<Symbol, ConvertError> {
    let member = match Substitution::for_reference(&ancestor.reference) {
        Some(subst) => substitute_member(member, &subst),
        None => member.clone(),
    };
    let symbol = capture_member(&ancestor.ty.module, &ancestor.ty.full_name, &member, naming)?;
    let id = symbol.id().rehomed(&owner.module, &owner.full_name);
    Ok(symbol.with_id(id).with_provenance(provenance))
}

/// Declared members of one type, split by where they are emitted.
#[derive(Debug, Default)]
pub struct DeclaredMembers {
    pub instance: Vec<Candidate>,
    /// Statics that stay on the declaration.
    pub statics: Vec<Candidate>,
    /// Statics moved to the companion namespace.
    pub companion: Vec<Candidate>,
}

fn is_representable_indexer(member: &SourceMember) -> bool {
    member.index_parameters.len() <= 1
}

/// Whether `member` should be considered at all when it comes from `owner`.
fn is_admitted(mapper: &mut TypeMapper<'_, '_>, owner: &SourceType, member: &SourceMember, report: bool) -> bool {
    if !member.visibility.is_emitted() {
        return false;
    }
    if mapper.options().is_member_excluded(&owner.full_name, &member.name) {
        if report {
            let cited = format!("{}::{}", owner.full_name, member.name);
            mapper.report(dc::MEMBER_EXCLUDED, &[&cited]);
        }
        return false;
    }
    true
}

pub fn capture_declared(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    ancestry: &Ancestry<'_>,
) -> Result<DeclaredMembers, ConvertError> {
    let naming = mapper.options().naming;
    let mut out = DeclaredMembers::default();
    let lifts_statics = !ty.generic_parameters.is_empty();

    for member in &ty.members {
        // Explicit implementations are usually private; check them first.
        if let Some(interface) = &member.explicit_interface {
            let interface_name = interface.full_name().unwrap_or_default().to_string();
            if ancestry.interface(&interface_name).is_none() {
                let symbol = capture_member(&ty.module, &ty.full_name, member, &naming)?;
                mapper.report(
                    dc::EXPLICIT_IMPL_UNKNOWN_INTERFACE,
                    &[&cite_member(&symbol), &interface_name, &ty.full_name],
                );
            }
            continue;
        }
        if !is_admitted(mapper, ty, member, true) {
            continue;
        }
        let symbol = capture_member(&ty.module, &ty.full_name, member, &naming)?;
        if member.kind == SymbolKind::Property && !is_representable_indexer(member) {
            mapper.report(dc::INDEXER_UNREPRESENTABLE, &[&cite_member(&symbol)]);
            continue;
        }
        if member.kind == SymbolKind::Constructor && ty.is_interface() {
            continue;
        }

        if !symbol.is_static() {
            out.instance.push(Candidate::declared(symbol));
            continue;
        }
        if ty.is_interface() {
            out.companion.push(Candidate::declared(symbol));
            continue;
        }
        let mentions_own = lifts_statics
            && symbol
                .referenced_types()
                .iter()
                .any(|r| r.mentions_generic_parameter_of(&ty.full_name));
        if mentions_own {
            mapper.report(dc::STATIC_MEMBER_LIFTED, &[&cite_member(&symbol), &ty.full_name]);
            out.companion.push(Candidate::declared(lift_static(ty, symbol)));
        } else {
            out.statics.push(Candidate::declared(symbol));
        }
    }
    trace!(
        ty = %ty.full_name,
        instance = out.instance.len(),
        statics = out.statics.len(),
        companion = out.companion.len(),
        "captured declared members"
    );
    Ok(out)
}

/// Companion namespaces cannot see class type parameters: methods declare
/// them themselves, other members see them as `System.Object`.
fn lift_static(ty: &SourceType, symbol: Symbol) -> Symbol {
    match symbol {
        Symbol::Method(mut method) => {
            let mut generic_parameters: Vec<GenericParameterDecl> = ty.generic_parameters.clone();
            generic_parameters.append(&mut method.generic_parameters);
            for (position, p) in generic_parameters.iter_mut().enumerate() {
                p.position = position as u32;
            }
            method.generic_parameters = generic_parameters;
            Symbol::Method(method)
        }
        other => {
            let object = TypeReference::named(ty.module.clone(), "System.Object");
            let subst = Substitution::new(
                ty.full_name.clone(),
                vec![object; ty.generic_parameters.len()],
            );
            match other {
                Symbol::Field(mut s) => {
                    s.ty = s.ty.substitute(&subst);
                    Symbol::Field(s)
                }
                Symbol::Property(mut s) => {
                    s.ty = s.ty.substitute(&subst);
                    for p in &mut s.index_parameters {
                        p.ty = p.ty.substitute(&subst);
                    }
                    Symbol::Property(s)
                }
                Symbol::Event(mut s) => {
                    s.handler = s.handler.substitute(&subst);
                    Symbol::Event(s)
                }
                Symbol::Constructor(_) | Symbol::Method(_) => other,
            }
        }
    }
}

fn overrides(existing: &[Candidate], member: &SourceMember) -> bool {
    existing.iter().any(|c| {
        let symbol = &c.symbol;
        symbol.source_name() == member.name
            && symbol.kind() == member.kind
            && match symbol {
                Symbol::Method(m) => m.parameters.len() == member.parameters.len(),
                Symbol::Property(p) => p.index_parameters.len() == member.index_parameters.len(),
                Symbol::Constructor(_) | Symbol::Field(_) | Symbol::Event(_) => true,
            }
    })
}

/// Public instance members of bases that are not emitted, nearest base
/// first. Members a nearer declaration overrides are skipped.
pub fn capture_inherited(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    ancestry: &Ancestry<'_>,
    declared: &[Candidate],
) -> Result<Vec<Candidate>, ConvertError> {
    let naming = mapper.options().naming;
    let mut out: Vec<Candidate> = Vec::new();
    for base in ancestry.flattened_bases() {
        for member in &base.ty.members {
            if member.kind == SymbolKind::Constructor
                || member.explicit_interface.is_some()
                || member.flags.contains(MemberFlags::STATIC)
                || !is_representable_indexer(member)
                || !is_admitted(mapper, base.ty, member, false)
            {
                continue;
            }
            if overrides(declared, member) || overrides(&out, member) {
                continue;
            }
            let symbol = capture_from_ancestor(ty, base, member, Provenance::Inherited, &naming)?;
            out.push(Candidate::declared(symbol));
        }
    }
    Ok(out)
}

/// Interface members not already satisfied by an existing candidate, for
/// every implemented interface not inherited through the emitted base.
pub fn capture_interface_sourced(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    ancestry: &Ancestry<'_>,
    existing: &[Candidate],
) -> Result<Vec<Candidate>, ConvertError> {
    let naming = mapper.options().naming;
    let existing_shapes: Vec<(String, Shape)> = existing
        .iter()
        .filter(|c| !c.symbol.is_static())
        .map(|c| (c.symbol.source_name().to_string(), shape(mapper, &c.symbol)))
        .collect();
    let mut out: Vec<Candidate> = Vec::new();
    let mut added: Vec<(String, Shape)> = Vec::new();

    for interface in &ancestry.interfaces {
        if ancestry.inherited_interfaces.contains(interface.full_name()) {
            continue;
        }
        for member in interface_members(mapper, interface) {
            let symbol =
                capture_from_ancestor(ty, interface, member, Provenance::InterfaceSourced, &naming)?;
            let member_shape = shape(mapper, &symbol);
            let satisfied = existing_shapes
                .iter()
                .chain(added.iter())
                .any(|(name, s)| *name == member.name && *s == member_shape);
            if satisfied {
                continue;
            }
            added.push((member.name.clone(), member_shape));
            out.push(Candidate {
                symbol,
                interface: Some(interface.reference.clone()),
            });
        }
    }
    Ok(out)
}

/// Instance members an interface contributes to implementers.
pub fn interface_members<'t>(
    mapper: &mut TypeMapper<'_, '_>,
    interface: &Ancestor<'t>,
) -> Vec<&'t SourceMember> {
    interface
        .ty
        .members
        .iter()
        .filter(|m| {
            m.kind != SymbolKind::Constructor
                && !m.flags.contains(MemberFlags::STATIC)
                && m.explicit_interface.is_none()
                && is_representable_indexer(m)
        })
        .filter(|m| is_admitted(mapper, interface.ty, m, false))
        .collect()
}

fn render_parameters(mapper: &mut TypeMapper<'_, '_>, parameters: &[Parameter]) -> Vec<ParameterDecl> {
    parameters
        .iter()
        .map(|p| ParameterDecl {
            name: p.emitted_name.clone().unwrap_or_else(|| p.name.clone()),
            ty: mapper.map(&p.ty),
            optional: p.is_optional,
            rest: p.is_params,
        })
        .collect()
}

/// Render a named symbol into its declaration form.
pub fn render_member(mapper: &mut TypeMapper<'_, '_>, symbol: Symbol) -> MemberDecl {
    let (type_parameters, parameters, ty) = match &symbol {
        Symbol::Constructor(s) => (Vec::new(), render_parameters(mapper, &s.parameters), String::new()),
        Symbol::Method(s) => (
            s.generic_parameters
                .iter()
                .map(|g| mapper.render_type_parameter(g))
                .collect(),
            render_parameters(mapper, &s.parameters),
            mapper.map(&s.return_type),
        ),
        Symbol::Property(s) => (
            Vec::new(),
            render_parameters(mapper, &s.index_parameters),
            mapper.map(&s.ty),
        ),
        Symbol::Field(s) => (Vec::new(), Vec::new(), mapper.map(&s.ty)),
        Symbol::Event(s) => (Vec::new(), Vec::new(), mapper.map(&s.handler)),
    };
    MemberDecl {
        symbol,
        type_parameters,
        parameters,
        ty,
    }
}

#[cfg(test)]
#[path = "tests/members_tests.rs"]
mod tests;
