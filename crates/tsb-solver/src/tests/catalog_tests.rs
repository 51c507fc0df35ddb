use super::*;
use crate::fixture::*;
use tsb_model::{ForwardedType, GenericParameterDecl, InMemoryLoader, Visibility};

fn forward(full_name: &str, target: &str, outcome: ForwardOutcome) -> ForwardedType {
    ForwardedType {
        full_name: full_name.to_string(),
        target_module: target.to_string(),
        outcome,
    }
}

#[test]
fn test_ancestry_substitutes_heritage_arguments() {
    let ibox = interface("Ns.IBox`1")
        .with_generic_parameter(GenericParameterDecl::new("T", 0))
        .with_member(method("Get", TypeReference::generic_parameter("Ns.IBox`1", "T", 0)));
    let int_box = class("Ns.IntBox").with_interface(TypeReference::generic(CORE, "Ns.IBox`1", vec![int()]));
    let loader = loader(vec![ibox, int_box]);

    let ((), pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.IntBox", |mapper| {
        let ty = lookup(mapper, "Ns.IntBox");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        assert_eq!(ancestry.interfaces.len(), 1);
        let iface = &ancestry.interfaces[0];
        assert!(iface.direct);
        assert!(iface.emitted);
        let ret = iface.ty.members[0].ty.clone().unwrap();
        assert_eq!(iface.substitute(&ret), int());
    });
    assert!(pass.sink.is_empty());
}

#[test]
fn test_flattened_bases_stop_at_emitted_base() {
    let root = class("Ns.Root");
    let hidden = class("Ns.Hidden")
        .with_visibility(Visibility::Internal)
        .with_base(local("Ns.Root"));
    let leaf = class("Ns.Leaf").with_base(local("Ns.Hidden"));
    let loader = loader(vec![root, hidden, leaf]);

    with_mapper(&loader, &EngineOptions::new(), "Ns.Leaf", |mapper| {
        let ty = lookup(mapper, "Ns.Leaf");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        let names: Vec<_> = ancestry.bases.iter().map(|b| b.full_name()).collect();
        assert_eq!(names, vec!["Ns.Hidden", "Ns.Root"]);
        assert_eq!(ancestry.flattened_bases().len(), 1);
        assert_eq!(ancestry.emitted_base().map(|b| b.full_name()), Some("Ns.Root"));
        assert!(ancestry.bases[0].direct);
        assert!(!ancestry.bases[1].direct);
    });
}

#[test]
fn test_implicit_object_base_is_dropped() {
    let plain = class("Ns.Plain").with_base(sys("Object"));
    let loader = loader(vec![plain]);
    let ((), pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.Plain", |mapper| {
        let ty = lookup(mapper, "Ns.Plain");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        assert!(ancestry.bases.is_empty());
    });
    assert!(pass.sink.is_empty());
}

#[test]
fn test_unresolved_ancestors_are_reported_as_leaves() {
    let orphan = class("Ns.Orphan")
        .with_base(local("Ns.Missing"))
        .with_interface(local("Ns.IMissing"));
    let loader = loader(vec![orphan]);

    let ((), pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.Orphan", |mapper| {
        let ty = lookup(mapper, "Ns.Orphan");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        assert!(ancestry.bases.is_empty());
        assert!(ancestry.interfaces.is_empty());
    });
    assert_eq!(
        codes(&pass),
        vec![dc::UNRESOLVED_BASE_TYPE, dc::UNRESOLVED_INTERFACE]
    );
}

#[test]
fn test_interface_cycle_is_reported_and_cut() {
    let ia = interface("Ns.IA").with_interface(local("Ns.IB"));
    let ib = interface("Ns.IB").with_interface(local("Ns.IA"));
    let c = class("Ns.C").with_interface(local("Ns.IA"));
    let loader = loader(vec![ia, ib, c]);

    let ((), pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.C", |mapper| {
        let ty = lookup(mapper, "Ns.C");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        let names: Vec<_> = ancestry.interfaces.iter().map(|i| i.full_name()).collect();
        assert_eq!(names, vec!["Ns.IA", "Ns.IB"]);
        assert!(ancestry.interfaces[0].direct);
        assert!(!ancestry.interfaces[1].direct);
    });
    assert_eq!(codes(&pass), vec![dc::INHERITANCE_CYCLE]);
}

#[test]
fn test_base_cycle_is_reported_and_cut() {
    let x = class("Ns.X").with_base(local("Ns.Y"));
    let y = class("Ns.Y").with_base(local("Ns.X"));
    let loader = loader(vec![x, y]);

    let ((), pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.X", |mapper| {
        let ty = lookup(mapper, "Ns.X");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        assert_eq!(ancestry.bases.len(), 1);
        assert_eq!(ancestry.bases[0].full_name(), "Ns.Y");
    });
    assert_eq!(codes(&pass), vec![dc::INHERITANCE_CYCLE]);
}

#[test]
fn test_interfaces_of_emitted_base_are_inherited() {
    let iface = interface("Ns.IRun").with_interface(local("Ns.IStep"));
    let step = interface("Ns.IStep");
    let base = class("Ns.Runner").with_interface(local("Ns.IRun"));
    let child = class("Ns.FastRunner").with_base(local("Ns.Runner"));
    let loader = loader(vec![iface, step, base, child]);

    with_mapper(&loader, &EngineOptions::new(), "Ns.FastRunner", |mapper| {
        let ty = lookup(mapper, "Ns.FastRunner");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        assert!(ancestry.interfaces.is_empty());
        assert!(ancestry.inherited_interfaces.contains("Ns.IRun"));
        assert!(ancestry.inherited_interfaces.contains("Ns.IStep"));
    });
}

#[test]
fn test_duplicate_types_keep_first_definition() {
    let loader = loader(vec![class("Ns.Dup"), interface("Ns.Dup")]);
    let ((), pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.Dup", |mapper| {
        assert_eq!(mapper.catalog().kind_of(&local("Ns.Dup")), Some(SourceKind::Class));
        assert_eq!(mapper.catalog().emitted_types().len(), 1);
    });
    assert_eq!(codes(&pass), vec![dc::DUPLICATE_TYPE]);
}

#[test]
fn test_forwarded_entries_load_or_degrade() {
    let core = module(vec![class("Ns.User")])
        .with_forwarded(forward(
            "Ns.Moved",
            "Impl",
            ForwardOutcome::Loaded(SourceType::class("Impl", "Ns.Moved")),
        ))
        .with_forwarded(forward("Ns.Lost", "Gone", ForwardOutcome::Failed("missing file".to_string())));
    let loader = InMemoryLoader::new().with_module(core);

    let ((), pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.User", |mapper| {
        let catalog = mapper.catalog();
        assert!(matches!(catalog.resolve_owner(CORE, "Ns.Moved"), Ownership::Local(_)));
        assert!(catalog.is_local_emitted("Ns.Moved"));
        match catalog.resolve_owner(CORE, "Ns.Lost") {
            Ownership::Foreign { module, ty } => {
                assert_eq!(module, "Gone");
                assert!(ty.is_none());
            }
            other => panic!("expected a foreign owner, got {other:?}"),
        }
    });
    assert_eq!(codes(&pass), vec![dc::FORWARDED_TYPE_LOAD_FAILED]);
}

#[test]
fn test_forwarding_loop_is_detected() {
    let a = LoadedModule::new("A").with_forwarded(forward("Ns.Loop", "B", ForwardOutcome::Failed("loop".into())));
    let b = LoadedModule::new("B").with_forwarded(forward("Ns.Loop", "A", ForwardOutcome::Failed("loop".into())));
    let loader = InMemoryLoader::new()
        .with_module(module(vec![class("Ns.User")]))
        .with_module(a)
        .with_module(b);

    with_mapper(&loader, &EngineOptions::new(), "Ns.User", |mapper| {
        assert!(matches!(
            mapper.catalog().resolve_owner("A", "Ns.Loop"),
            Ownership::Cycle { .. }
        ));
    });
}

#[test]
fn test_excluded_namespaces_are_reported_once_and_skipped() {
    let loader = loader(vec![
        class("Ns.Internal.A"),
        class("Ns.Internal.B"),
        class("Ns.Public"),
    ]);
    let options = EngineOptions::new().exclude_namespace("Ns.Internal");
    let ((), pass) = with_mapper(&loader, &options, "Ns.Public", |mapper| {
        let names: Vec<_> = mapper
            .catalog()
            .emitted_types()
            .iter()
            .map(|t| t.full_name.clone())
            .collect();
        assert_eq!(names, vec!["Ns.Public"]);
    });
    assert_eq!(codes(&pass), vec![dc::NAMESPACE_EXCLUDED]);
}

#[test]
fn test_emitted_types_sorted_by_namespace_then_name() {
    let loader = loader(vec![class("Zeta.B"), class("Alpha.Z"), class("Alpha.A")]);
    with_mapper(&loader, &EngineOptions::new(), "Alpha.A", |mapper| {
        let names: Vec<_> = mapper
            .catalog()
            .emitted_types()
            .iter()
            .map(|t| t.full_name.clone())
            .collect();
        assert_eq!(names, vec!["Alpha.A", "Alpha.Z", "Zeta.B"]);
    });
}

#[test]
fn test_interface_closure_excludes_self() {
    let ia = interface("Ns.IA").with_interface(local("Ns.IB"));
    let ib = interface("Ns.IB").with_interface(local("Ns.IC"));
    let ic = interface("Ns.IC").with_interface(local("Ns.IA"));
    let loader = loader(vec![ia, ib, ic]);
    with_mapper(&loader, &EngineOptions::new(), "Ns.IA", |mapper| {
        let closure = mapper.catalog().interface_closure(&local("Ns.IA"));
        assert_eq!(closure.into_iter().collect::<Vec<_>>(), vec!["Ns.IB", "Ns.IC"]);
    });
}
