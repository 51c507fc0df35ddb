use super::*;

fn int32() -> TypeReference {
    TypeReference::named("Core", "System.Int32")
}

#[test]
fn test_source_type_derives_names() {
    let ty = SourceType::class("Core", "Ns.Outer+Inner");
    assert_eq!(ty.namespace, "Ns");
    assert_eq!(ty.name, "Inner");
    assert_eq!(ty.declaring_type.as_deref(), Some("Ns.Outer"));
}

#[test]
fn test_self_reference_uses_own_parameters() {
    let ty = SourceType::class("Core", "Ns.Box`1").with_generic_parameter(GenericParameterDecl::new("T", 0));
    let reference = ty.self_reference();
    let named = reference.as_named().unwrap();
    assert_eq!(
        named.type_arguments,
        vec![TypeReference::generic_parameter("Ns.Box`1", "T", 0)]
    );
    assert!(!named.is_open());
}

#[test]
fn test_normalized_fills_loader_gaps() {
    let json = r#"{"fullName":"Ns.Point","kind":"struct","members":[
        {"name":"X","kind":"field","type":{"kind":"named","module":"Core","fullName":"System.Int32"}}
    ]}"#;
    let ty: SourceType = serde_json::from_str(json).unwrap();
    let ty = ty.normalized("Core");
    assert_eq!(ty.module, "Core");
    assert_eq!(ty.namespace, "Ns");
    assert_eq!(ty.name, "Point");
    assert_eq!(ty.members[0].ty, Some(int32()));
    assert!(ty.members[0].has_getter);
    assert!(ty.kind.is_value_type());
}

#[test]
fn test_in_memory_loader_lookups() {
    let core = LoadedModule::new("Core")
        .with_type(SourceType::class("Core", "Ns.Widget"))
        .with_forwarded(ForwardedType {
            full_name: "Ns.Moved".to_string(),
            target_module: "Other".to_string(),
            outcome: ForwardOutcome::Failed("missing".to_string()),
        });
    let loader = InMemoryLoader::new().with_module(core);

    assert!(loader.find_type("Core", "Ns.Widget").is_some());
    assert!(loader.find_type("Core", "Ns.Moved").is_none());
    assert_eq!(loader.forwarded_to("Core", "Ns.Moved"), Some("Other"));
    assert_eq!(loader.load_module("Core").unwrap().types.len(), 1);
    assert_eq!(
        loader.load_module("Nope"),
        Err(LoadError::NotFound("Nope".to_string()))
    );
}

#[test]
fn test_constant_member_is_static() {
    let member = SourceMember::field("Max", int32()).with_constant(ConstantValue::Int(10));
    assert!(member.flags.contains(MemberFlags::STATIC | MemberFlags::CONST));
}
