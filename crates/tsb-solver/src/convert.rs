//! Per-type conversion: one source type in, its declarations out.

use crate::catalog::Ancestry;
use crate::diamond::resolve_heritage;
use crate::error::ConvertError;
use crate::mapper::TypeMapper;
use crate::members::{
    Candidate, capture_declared, capture_inherited, capture_interface_sourced, capture_member,
    render_member,
};
use crate::naming::{
    elide_redundant_properties, report_interface_conflicts, resolve_class_surface, resolve_scope,
};
use crate::overloads::reconcile;
use crate::primitives::MapSite;
use rustc_hash::FxHashSet;
use tracing::instrument;
use tsb_common::{diagnostic_codes as dc, sanitize_identifier};
use tsb_model::{
    ClassDecl, Declaration, EnumDecl, EnumMember, InterfaceDecl, MemberDecl, MemberFlags,
    SourceKind, SourceType, StaticNamespaceDecl, Symbol, SymbolKind, TypeReference, TypeText,
    ViewAccessor,
};

#[instrument(level = "debug", skip_all, fields(ty = %ty.full_name))]
pub fn convert_type(mapper: &mut TypeMapper<'_, '_>, ty: &SourceType) -> Result<Vec<Declaration>, ConvertError> {
    match ty.kind {
        SourceKind::Class | SourceKind::Struct => convert_class(mapper, ty),
        SourceKind::Interface => convert_interface(mapper, ty).map(|d| vec![d]),
        SourceKind::Enum => convert_enum(mapper, ty).map(|d| vec![d]),
        SourceKind::StaticClass => convert_static_class(mapper, ty).map(|d| vec![d]),
        SourceKind::Delegate => convert_delegate(mapper, ty).map(|d| vec![d]),
    }
}

fn declaration_name(mapper: &mut TypeMapper<'_, '_>, ty: &SourceType) -> String {
    let reference = ty.self_reference();
    mapper.flatten_name(&reference)
}

fn render_type_parameters(mapper: &mut TypeMapper<'_, '_>, ty: &SourceType) -> Vec<String> {
    ty.generic_parameters
        .iter()
        .map(|p| mapper.render_type_parameter(p))
        .collect()
}

fn render_members(mapper: &mut TypeMapper<'_, '_>, symbols: Vec<Symbol>) -> Vec<MemberDecl> {
    symbols.into_iter().map(|s| render_member(mapper, s)).collect()
}

fn companion(
    mapper: &mut TypeMapper<'_, '_>,
    ty: &SourceType,
    name: &str,
    candidates: Vec<Candidate>,
) -> Option<StaticNamespaceDecl> {
    if candidates.is_empty() {
        return None;
    }
    let symbols = resolve_scope(mapper, &ty.full_name, candidates);
    Some(StaticNamespaceDecl {
        name: name.to_string(),
        source: ty.self_reference(),
        members: render_members(mapper, symbols),
    })
}

/// Interfaces the type's heritage names directly, with interfaces that are
/// not emitted replaced by their own emitted parents.
fn direct_interfaces(mapper: &mut TypeMapper<'_, '_>, ancestry: &Ancestry<'_>) -> Vec<TypeReference> {
    let catalog = mapper.catalog();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut out = Vec::new();
    for interface in ancestry.interfaces.iter().filter(|i| i.direct) {
        if interface.emitted {
            if seen.insert(interface.full_name().to_string()) {
                out.push(interface.reference.clone());
            }
            continue;
        }
        for parent in &interface.ty.interfaces {
            let parent = interface.substitute(parent);
            let Some(parent_ty) = catalog.resolve(&parent) else {
                continue;
            };
            if catalog.is_emitted(parent_ty) && seen.insert(parent_ty.full_name.clone()) {
                out.push(parent);
            }
        }
    }
    out
}

fn convert_class(mapper: &mut TypeMapper<'_, '_>, ty: &SourceType) -> Result<Vec<Declaration>, ConvertError> {
    let catalog = mapper.catalog();
    let ancestry = catalog.ancestry(ty, &mut mapper.pass().sink);
    let name = declaration_name(mapper, ty);

    let declared = capture_declared(mapper, ty, &ancestry)?;
    let mut candidates = reconcile(mapper, ty, &ancestry, declared.instance)?;
    let inherited = capture_inherited(mapper, ty, &ancestry, &candidates)?;
    candidates.extend(inherited);
    let sourced = capture_interface_sourced(mapper, ty, &ancestry, &candidates)?;
    candidates.extend(sourced);
    let candidates = elide_redundant_properties(mapper, ty, &ancestry, candidates)?;
    let plan = resolve_class_surface(mapper, ty, &ancestry, &name, candidates, declared.statics)?;

    let type_parameters = render_type_parameters(mapper, ty);
    let base = ancestry
        .emitted_base()
        .map(|b| b.reference.clone())
        .map(|reference| {
            let text = mapper.map(&reference);
            TypeText::new(reference, text)
        });
    let heritage: Vec<TypeReference> = direct_interfaces(mapper, &ancestry)
        .into_iter()
        .filter(|r| !r.full_name().is_some_and(|n| plan.is_demoted(n)))
        .collect();
    let implements = resolve_heritage(mapper, &heritage, false);

    let own_arguments: Vec<String> = ty
        .generic_parameters
        .iter()
        .map(|p| mapper.type_parameter_name(&p.name))
        .collect();
    let applied = |view: &str| {
        if own_arguments.is_empty() {
            view.to_string()
        } else {
            format!("{view}<{}>", own_arguments.join(", "))
        }
    };

    let mut views = Vec::with_capacity(plan.views.len());
    let mut view_declarations = Vec::with_capacity(plan.views.len());
    for view in plan.views {
        views.push(ViewAccessor {
            property: view.accessor,
            view: view.name.clone(),
            interface: view.interface.clone(),
            type_text: applied(&view.name),
        });
        let members = render_members(mapper, view.members);
        view_declarations.push(Declaration::Interface(InterfaceDecl {
            name: view.name,
            source: view.interface,
            type_parameters: type_parameters.clone(),
            extends: Vec::new(),
            members,
            diamond_base: false,
            view_of: Some(ty.full_name.clone()),
            companion: None,
        }));
    }

    let members = render_members(mapper, plan.members);
    let companion = companion(mapper, ty, &name, declared.companion);
    let mut out = vec![Declaration::Class(ClassDecl {
        name,
        source: ty.self_reference(),
        type_parameters,
        base,
        implements,
        members,
        companion,
        views,
        is_abstract: ty.is_abstract,
        is_struct: ty.kind == SourceKind::Struct,
    })];
    out.extend(view_declarations);
    Ok(out)
}

fn convert_interface(mapper: &mut TypeMapper<'_, '_>, ty: &SourceType) -> Result<Declaration, ConvertError> {
    let catalog = mapper.catalog();
    let ancestry = catalog.ancestry(ty, &mut mapper.pass().sink);
    let name = declaration_name(mapper, ty);

    let declared = capture_declared(mapper, ty, &ancestry)?;
    report_interface_conflicts(mapper, ty, &ancestry, &declared.instance)?;
    let candidates = reconcile(mapper, ty, &ancestry, declared.instance)?;
    let candidates = elide_redundant_properties(mapper, ty, &ancestry, candidates)?;
    let symbols = resolve_scope(mapper, &ty.full_name, candidates);

    let type_parameters = render_type_parameters(mapper, ty);
    let heritage = direct_interfaces(mapper, &ancestry);
    let extends = resolve_heritage(mapper, &heritage, true);
    let members = render_members(mapper, symbols);
    let companion = companion(mapper, ty, &name, declared.companion);
    Ok(Declaration::Interface(InterfaceDecl {
        name,
        source: ty.self_reference(),
        type_parameters,
        extends,
        members,
        diamond_base: false,
        view_of: None,
        companion,
    }))
}

/// Delegates become interfaces with a single `invoke` call member.
fn convert_delegate(mapper: &mut TypeMapper<'_, '_>, ty: &SourceType) -> Result<Declaration, ConvertError> {
    let name = declaration_name(mapper, ty);
    let naming = mapper.options().naming;
    let mut invokes = ty
        .members
        .iter()
        .filter(|m| m.kind == SymbolKind::Method && m.name == "Invoke");
    let invoke = invokes.next();
    if invokes.next().is_some() {
        return Err(ConvertError::AmbiguousInvoke);
    }
    let members = match invoke {
        Some(invoke) => {
            let symbol = capture_member(&ty.module, &ty.full_name, invoke, &naming)?.with_emitted_name("invoke");
            vec![render_member(mapper, symbol)]
        }
        None => Vec::new(),
    };
    let type_parameters = render_type_parameters(mapper, ty);
    Ok(Declaration::Interface(InterfaceDecl {
        name,
        source: ty.self_reference(),
        type_parameters,
        extends: Vec::new(),
        members,
        diamond_base: false,
        view_of: None,
        companion: None,
    }))
}

fn convert_static_class(mapper: &mut TypeMapper<'_, '_>, ty: &SourceType) -> Result<Declaration, ConvertError> {
    let catalog = mapper.catalog();
    let ancestry = catalog.ancestry(ty, &mut mapper.pass().sink);
    let name = declaration_name(mapper, ty);
    let declared = capture_declared(mapper, ty, &ancestry)?;
    let candidates: Vec<Candidate> = declared
        .statics
        .into_iter()
        .chain(declared.companion)
        .filter(|c| c.symbol.kind() != SymbolKind::Constructor)
        .collect();
    let symbols = resolve_scope(mapper, &ty.full_name, candidates);
    Ok(Declaration::StaticNamespace(StaticNamespaceDecl {
        name,
        source: ty.self_reference(),
        members: render_members(mapper, symbols),
    }))
}

fn convert_enum(mapper: &mut TypeMapper<'_, '_>, ty: &SourceType) -> Result<Declaration, ConvertError> {
    let name = declaration_name(mapper, ty);
    let naming = mapper.options().naming;
    let underlying = ty
        .enum_underlying
        .clone()
        .unwrap_or_else(|| TypeReference::named(ty.module.clone(), "System.Int32"));
    let underlying = mapper.map_at(&underlying, MapSite::Numeric);

    let mut taken: FxHashSet<String> = FxHashSet::default();
    let mut members = Vec::new();
    for member in &ty.members {
        if member.kind != SymbolKind::Field || !member.flags.contains(MemberFlags::STATIC) {
            continue;
        }
        let value = member.constant.clone().ok_or_else(|| ConvertError::MissingEnumValue {
            member: format!("{}::{}", ty.full_name, member.name),
        })?;
        let sanitized = sanitize_identifier(&naming.enum_member.apply(&member.name), false);
        let mut emitted = sanitized.text;
        if !taken.insert(emitted.clone()) {
            let mut suffix = 2;
            while taken.contains(&format!("{emitted}{suffix}")) {
                suffix += 1;
            }
            let renamed = format!("{emitted}{suffix}");
            let cited = format!("{}::{}", ty.full_name, member.name);
            mapper.report(dc::MEMBER_RENAMED, &[&cited, &renamed, &ty.full_name]);
            taken.insert(renamed.clone());
            emitted = renamed;
        }
        members.push(EnumMember {
            source_name: member.name.clone(),
            emitted_name: emitted,
            value,
        });
    }

    Ok(Declaration::Enum(EnumDecl {
        name,
        source: ty.self_reference(),
        underlying,
        members,
        is_flags: ty.is_flags,
    }))
}
