//! End-to-end conversion of whole modules.

mod support;

use support::*;
use tsb_common::NameTransform;
use tsb_common::diagnostic_codes as dc;
use tsb_model::{
    ConstantValue, Declaration, ForwardOutcome, ForwardedType, GenericParameterDecl, InMemoryLoader,
    LoadedModule, MemberFlags, SourceKind, SourceMember, SourceType, TypeReference,
};
use tsb_solver::{BindingEngine, EngineError, EngineOptions, NamingPolicy};

#[test]
fn test_missing_module_is_fatal() {
    let loader = InMemoryLoader::new();
    let err = BindingEngine::new(&loader, EngineOptions::new())
        .generate("Nowhere")
        .unwrap_err();
    assert!(matches!(err, EngineError::ModuleLoad { ref module, .. } if module == "Nowhere"));
    assert_eq!(err.to_string(), "module 'Nowhere' could not be loaded");
}

#[test]
fn test_declarations_are_grouped_and_sorted() {
    let output = run(vec![class("Zeta.Last"), class("Alpha.B"), class("Alpha.A")]);
    let namespaces: Vec<_> = output.namespaces.iter().map(|ns| ns.name.as_str()).collect();
    assert_eq!(namespaces, vec!["Alpha", "Zeta"]);
    assert_eq!(declaration_names(&output, "Alpha"), vec!["A", "B"]);
    assert!(output.namespaces.iter().all(|ns| ns.is_finalized()));
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_foreign_module_references_register_one_dependency() {
    let gadget = TypeReference::named("Other", "OtherNs.Gadget");
    let user = class("Ns.User")
        .with_member(SourceMember::property("Current", gadget.clone()))
        .with_member(method("Make", gadget.clone()))
        .with_member(method_with("Use", vec![("gadget", gadget)], void()));
    let loader = InMemoryLoader::new()
        .with_module(core_module(vec![user]))
        .with_module(LoadedModule::new("Other").with_type(SourceType::class("Other", "OtherNs.Gadget")));
    let output = run_with(&loader, EngineOptions::new());

    let user = class_decl(&output, "Ns", "User");
    assert_eq!(user.members[0].ty, "Other.OtherNs.Gadget");
    assert_eq!(user.members[1].ty, "Other.OtherNs.Gadget");
    assert_eq!(user.members[2].parameters[0].ty, "Other.OtherNs.Gadget");

    assert_eq!(output.dependencies.len(), 1);
    assert_eq!(output.dependencies[0].module, "Other");
    assert_eq!(output.dependencies[0].alias, "Other");
    assert_eq!(output.dependencies[0].types, vec!["OtherNs.Gadget"]);
    assert_eq!(count(&output, dc::DEPENDENCY_REGISTERED), 1);
}

#[test]
fn test_forwarding_cycle_degrades_to_placeholder() {
    let forward = |target: &str| ForwardedType {
        full_name: "Ns.Loop".to_string(),
        target_module: target.to_string(),
        outcome: ForwardOutcome::Failed("cycle".to_string()),
    };
    let user = class("Ns.User").with_member(SourceMember::property("Loop", TypeReference::named("A", "Ns.Loop")));
    let loader = InMemoryLoader::new()
        .with_module(core_module(vec![user]))
        .with_module(LoadedModule::new("A").with_forwarded(forward("B")))
        .with_module(LoadedModule::new("B").with_forwarded(forward("A")));
    let output = run_with(&loader, EngineOptions::new());

    assert_eq!(class_decl(&output, "Ns", "User").members[0].ty, "any");
    assert_eq!(count(&output, dc::FORWARDING_CYCLE), 1);
    assert_eq!(count(&output, dc::PLACEHOLDER_EMITTED), 1);
    assert!(output.dependencies.is_empty());
}

#[test]
fn test_recursive_constraint_is_rendered() {
    let comparable = interface("Ns.IComparable`1")
        .with_generic_parameter(GenericParameterDecl::new("T", 0))
        .with_member(method_with(
            "CompareTo",
            vec![("other", TypeReference::generic_parameter("Ns.IComparable`1", "T", 0))],
            int(),
        ));
    let t = TypeReference::generic_parameter("Ns.Sorter`1", "T", 0);
    let sorter = class("Ns.Sorter`1").with_generic_parameter(
        GenericParameterDecl::new("T", 0).with_constraint(TypeReference::generic(CORE, "Ns.IComparable`1", vec![t.clone()])),
    );
    let sorter = sorter.with_member(method_with("Sort", vec![("items", TypeReference::array(t, 1))], void()));
    let output = run(vec![comparable, sorter]);

    let decl = class_decl(&output, "Ns", "Sorter_1");
    assert_eq!(decl.type_parameters, vec!["T extends IComparable_1<T>"]);
    assert_eq!(decl.members[0].parameters[0].ty, "T[]");
    let comparable = interface_decl(&output, "Ns", "IComparable_1");
    assert_eq!(comparable.type_parameters, vec!["T"]);
    assert_eq!(comparable.members[0].parameters[0].ty, "T");
}

#[test]
fn test_failed_type_is_dropped_and_reported() {
    let broken = class("Ns.Broken").with_member(SourceMember {
        ty: None,
        ..method("Value", int())
    });
    let output = run(vec![broken, class("Ns.Fine")]);
    assert_eq!(declaration_names(&output, "Ns"), vec!["Fine"]);
    assert_eq!(count(&output, dc::TYPE_CONVERSION_FAILED), 1);
    let diagnostic = output.diagnostics_with_code(dc::TYPE_CONVERSION_FAILED).next().unwrap();
    assert!(diagnostic.message.contains("Ns.Broken"));
    assert!(diagnostic.message.contains("member 'Ns.Broken::Value' has no type"));
}

#[test]
fn test_excluded_namespace_and_member() {
    let secret = class("Ns.Hidden.Secret");
    let user = class("Ns.User")
        .with_member(SourceMember::property("Secret", local("Ns.Hidden.Secret")))
        .with_member(method("Drop", void()))
        .with_member(method("Keep", void()));
    let loader = InMemoryLoader::new().with_module(core_module(vec![secret, user]));
    let options = EngineOptions::new()
        .exclude_namespace("Ns.Hidden")
        .exclude_member("Ns.User::Drop");
    let output = run_with(&loader, options);

    assert!(output.namespace("Ns.Hidden").is_none());
    let user = declaration(&output, "Ns", "User");
    assert_eq!(member_names(user), vec!["Secret", "Keep"]);
    assert_eq!(user.members()[0].ty, "any");
    assert_eq!(count(&output, dc::NAMESPACE_EXCLUDED), 1);
    assert_eq!(count(&output, dc::MEMBER_EXCLUDED), 1);
}

#[test]
fn test_camel_case_members_keep_declaration_names() {
    let user = class("Ns.UserStore")
        .with_member(method_with("GetValue", vec![("ItemKey", string())], int()))
        .with_member(SourceMember::property("IsOpen", sys("Boolean")));
    let loader = InMemoryLoader::new().with_module(core_module(vec![user]));
    let output = run_with(&loader, EngineOptions::new().with_naming(NamingPolicy::camel_case_members()));

    let store = declaration(&output, "Ns", "UserStore");
    assert_eq!(member_names(store), vec!["getValue", "isOpen"]);
    assert_eq!(store.members()[0].parameters[0].name, "itemKey");
}

#[test]
fn test_flattened_name_collision_is_suffixed() {
    let output = run(vec![
        class("Ns.Box`1").with_generic_parameter(GenericParameterDecl::new("T", 0)),
        class("Ns.Box_1"),
    ]);
    assert_eq!(declaration_names(&output, "Ns"), vec!["Box_1", "Box_1_2"]);
    let generic = class_decl(&output, "Ns", "Box_1_2");
    assert_eq!(generic.source.full_name(), Some("Ns.Box`1"));
    assert_eq!(count(&output, dc::DECLARATION_NAME_COLLISION), 1);
}

#[test]
fn test_enum_members_keep_values_and_suffix_duplicates() {
    let color = SourceType::enumeration(CORE, "Ns.Color")
        .with_member(SourceMember::field("Red", local("Ns.Color")).with_constant(ConstantValue::Int(1)))
        .with_member(SourceMember::field("red", local("Ns.Color")).with_constant(ConstantValue::Int(2)))
        .with_member(SourceMember::field("value__", int()));
    let naming = NamingPolicy {
        enum_member: NameTransform::CamelCase,
        ..NamingPolicy::default()
    };
    let loader = InMemoryLoader::new().with_module(core_module(vec![color]));
    let output = run_with(&loader, EngineOptions::new().with_naming(naming));

    let Declaration::Enum(color) = declaration(&output, "Ns", "Color") else {
        panic!("expected an enum");
    };
    assert_eq!(color.underlying, "int");
    let names: Vec<_> = color.members.iter().map(|m| m.emitted_name.as_str()).collect();
    assert_eq!(names, vec!["red", "red2"]);
    assert_eq!(color.members[1].value, ConstantValue::Int(2));
    assert_eq!(count(&output, dc::MEMBER_RENAMED), 1);
}

#[test]
fn test_enum_without_constant_fails_conversion() {
    let bad = SourceType::enumeration(CORE, "Ns.Bad")
        .with_member(SourceMember::field("Only", local("Ns.Bad")).with_flags(MemberFlags::STATIC));
    let output = run(vec![bad]);
    assert!(output.namespace("Ns").is_some_and(|ns| ns.declarations().is_empty()));
    assert_eq!(count(&output, dc::TYPE_CONVERSION_FAILED), 1);
}

#[test]
fn test_static_class_becomes_namespace() {
    let util = SourceType::new(CORE, "Ns.Util", SourceKind::StaticClass)
        .with_member(method_with("Parse", vec![("text", string())], int()).with_flags(MemberFlags::STATIC))
        .with_member(SourceMember::field("Version", string()).with_constant(ConstantValue::Str("1".into())));
    let output = run(vec![util]);
    let decl = declaration(&output, "Ns", "Util");
    assert!(matches!(decl, Declaration::StaticNamespace(_)));
    assert_eq!(member_names(decl), vec!["Parse", "Version"]);
}

#[test]
fn test_delegate_becomes_callable_interface() {
    let handler = SourceType::new(CORE, "Ns.Handler", SourceKind::Delegate)
        .with_member(SourceMember::constructor(Vec::new()))
        .with_member(method_with("Invoke", vec![("value", int())], void()));
    let output = run(vec![handler]);
    let handler = interface_decl(&output, "Ns", "Handler");
    assert_eq!(handler.members.len(), 1);
    assert_eq!(handler.members[0].name(), "invoke");
    assert_eq!(handler.members[0].parameters[0].ty, "int");
}

#[test]
fn test_delegate_with_two_invokes_fails() {
    let handler = SourceType::new(CORE, "Ns.Handler", SourceKind::Delegate)
        .with_member(method("Invoke", void()))
        .with_member(method_with("Invoke", vec![("value", int())], void()));
    let output = run(vec![handler]);
    assert_eq!(count(&output, dc::TYPE_CONVERSION_FAILED), 1);
    assert!(declaration_names(&output, "Ns").is_empty());
}

#[test]
fn test_generic_statics_move_to_companion() {
    let t = TypeReference::generic_parameter("Ns.Cache`1", "T", 0);
    let cache = class("Ns.Cache`1")
        .with_generic_parameter(GenericParameterDecl::new("T", 0))
        .with_member(SourceMember::field("Default", t.clone()).with_flags(MemberFlags::STATIC))
        .with_member(SourceMember::field("Hits", int()).with_flags(MemberFlags::STATIC))
        .with_member(method("Get", t));
    let output = run(vec![cache]);

    let cache = class_decl(&output, "Ns", "Cache_1");
    let surface: Vec<_> = cache.members.iter().map(|m| m.name()).collect();
    assert_eq!(surface, vec!["Get", "Hits"]);
    let companion = cache.companion.as_ref().expect("companion namespace");
    assert_eq!(companion.name, "Cache_1");
    assert_eq!(companion.members[0].name(), "Default");
    assert_eq!(companion.members[0].ty, "unknown");
    assert_eq!(count(&output, dc::STATIC_MEMBER_LIFTED), 1);
}

#[test]
fn test_struct_and_abstract_flags_are_carried() {
    let point = SourceType::new(CORE, "Ns.Point", SourceKind::Struct);
    let shape = SourceType {
        is_abstract: true,
        ..class("Ns.Shape")
    };
    let output = run(vec![point, shape]);
    assert!(class_decl(&output, "Ns", "Point").is_struct);
    assert!(class_decl(&output, "Ns", "Shape").is_abstract);
}

#[test]
fn test_output_is_deterministic() {
    let build = || {
        vec![
            interface("Ns.IBase").with_member(SourceMember::property("Id", int())),
            interface("Ns.ILeft").with_interface(local("Ns.IBase")),
            interface("Ns.IRight").with_interface(local("Ns.IBase")),
            class("Ns.Both")
                .with_interface(local("Ns.ILeft"))
                .with_interface(local("Ns.IRight")),
            class("Other.Thing").with_member(method("Both", local("Ns.Both"))),
        ]
    };
    let first = serde_json::to_string(&run(build())).unwrap();
    let second = serde_json::to_string(&run(build())).unwrap();
    assert_eq!(first, second);

    let mut reversed = build();
    reversed.reverse();
    let third = serde_json::to_string(&run(reversed)).unwrap();
    assert_eq!(first, third);
}
