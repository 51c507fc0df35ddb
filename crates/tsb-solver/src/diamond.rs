//! Diamond Inheritance Resolver
//!
//! When two or more direct interfaces of a type reach a common ancestor
//! interface, the target cannot list them side by side. The participants are
//! replaced in the heritage list by one intersection alias, queued on the
//! pass and appended to the namespace after its ordinary declarations. The
//! common ancestors become diamond-base candidates.

use crate::mapper::TypeMapper;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;
use tsb_common::diagnostic_codes as dc;
use tsb_model::{IntersectionAlias, TypeReference, TypeText};

/// Map a heritage list, folding converging interfaces into an alias.
///
/// `exempt` is set for interface `extends` clauses, which do not count as
/// uses of the interfaces they name.
pub fn resolve_heritage(
    mapper: &mut TypeMapper<'_, '_>,
    heritage: &[TypeReference],
    exempt: bool,
) -> Vec<TypeText> {
    let catalog = mapper.catalog();
    let closures: Vec<IndexSet<String>> = heritage.iter().map(|r| catalog.interface_closure(r)).collect();

    let mut participants: Vec<usize> = Vec::new();
    let mut common: IndexSet<String> = IndexSet::new();
    for i in 0..heritage.len() {
        for j in 0..heritage.len() {
            if i == j {
                continue;
            }
            let shared: Vec<&String> = closures[i].intersection(&closures[j]).collect();
            if shared.is_empty() {
                continue;
            }
            if !participants.contains(&i) {
                participants.push(i);
            }
            common.extend(shared.into_iter().cloned());
        }
    }

    if participants.len() < 2 {
        return heritage
            .iter()
            .map(|r| TypeText::new(r.clone(), render(mapper, r, exempt)))
            .collect();
    }

    // Constituents in key order so every type converging on the same set
    // shares one alias.
    let mut keyed: Vec<(String, &TypeReference)> = participants
        .iter()
        .map(|&i| (heritage[i].to_string(), &heritage[i]))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    let key: Vec<String> = keyed.iter().map(|(k, _)| k.clone()).collect();

    let namespace = mapper.namespace().to_string();
    let mut type_parameters: IndexMap<String, TypeReference> = IndexMap::new();
    for (_, reference) in &keyed {
        reference.walk(&mut |r| {
            if let TypeReference::GenericParameter(p) = r {
                let name = mapper.type_parameter_name(&p.name);
                type_parameters.entry(name).or_insert_with(|| r.clone());
            }
        });
    }

    let existing = mapper
        .pass()
        .pending_alias(&namespace, &key)
        .map(|alias| alias.name.clone());
    let name = match existing {
        Some(existing) => existing,
        None => {
            let desired = keyed
                .iter()
                .map(|(_, r)| mapper.flatten_name(r))
                .collect::<Vec<_>>()
                .join("_And_");
            let name = mapper.pass().reserve_name(&namespace, &desired, &desired);
            let constituents = keyed
                .iter()
                .map(|(_, r)| TypeText::new((*r).clone(), mapper.map_exempt(r)))
                .collect();
            mapper.pass().queue_alias(
                &namespace,
                IntersectionAlias {
                    name: name.clone(),
                    key: key.clone(),
                    type_parameters: type_parameters.keys().cloned().collect(),
                    constituents,
                },
            );
            name
        }
    };

    for ancestor in &common {
        mapper.pass().add_diamond_candidate(ancestor);
    }
    let owner = mapper.owner().to_string();
    let converged = common.iter().cloned().collect::<Vec<_>>().join(", ");
    mapper.report(dc::DIAMOND_RESOLVED, &[&owner, &converged, &name]);
    debug!(owner = %owner, alias = %name, participants = participants.len(), "resolved diamond");

    let alias_text = if type_parameters.is_empty() {
        name.clone()
    } else {
        format!("{name}<{}>", type_parameters.keys().cloned().collect::<Vec<_>>().join(", "))
    };
    let alias_full_name = if namespace.is_empty() {
        name
    } else {
        format!("{namespace}.{name}")
    };
    let alias_reference = TypeReference::generic(
        mapper.catalog().module().to_string(),
        alias_full_name,
        type_parameters.into_values().collect(),
    );

    let first = participants.iter().copied().min().unwrap_or(0);
    let mut out = Vec::with_capacity(heritage.len() - participants.len() + 1);
    for (i, reference) in heritage.iter().enumerate() {
        if i == first {
            out.push(TypeText::new(alias_reference.clone(), alias_text.clone()));
        } else if !participants.contains(&i) {
            out.push(TypeText::new(reference.clone(), render(mapper, reference, exempt)));
        }
    }
    out
}

fn render(mapper: &mut TypeMapper<'_, '_>, reference: &TypeReference, exempt: bool) -> String {
    if exempt {
        mapper.map_exempt(reference)
    } else {
        mapper.map(reference)
    }
}

#[cfg(test)]
#[path = "tests/diamond_tests.rs"]
mod tests;
