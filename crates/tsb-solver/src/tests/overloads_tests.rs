use super::*;
use crate::fixture::*;
use crate::members::capture_declared;
use crate::options::EngineOptions;
use crate::pass::ModulePass;
use tsb_model::GenericParameterDecl;

fn reconciled(types: Vec<SourceType>, owner: &str) -> (Vec<Candidate>, ModulePass) {
    let loader = loader(types);
    let (out, pass) = with_mapper(&loader, &EngineOptions::new(), owner, |mapper| {
        let ty = lookup(mapper, owner);
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        let declared = capture_declared(mapper, ty, &ancestry).unwrap();
        reconcile(mapper, ty, &ancestry, declared.instance).unwrap()
    });
    (out, pass)
}

fn returns(candidates: &[Candidate]) -> Vec<String> {
    candidates
        .iter()
        .map(|c| match &c.symbol {
            Symbol::Method(m) => m.return_type.to_string(),
            other => format!("{:?}", other.kind()),
        })
        .collect()
}

#[test]
fn test_covariant_return_gets_compatibility_overload() {
    let animal = class("Ns.Animal").with_member(method("Clone", local("Ns.Animal")));
    let dog = class("Ns.Dog")
        .with_base(local("Ns.Animal"))
        .with_member(method("Clone", local("Ns.Dog")).with_flags(MemberFlags::OVERRIDE));
    let (out, pass) = reconciled(vec![animal, dog], "Ns.Dog");

    assert_eq!(returns(&out), vec!["Ns.Dog", "Ns.Animal"]);
    let Symbol::Method(synthesized) = &out[1].symbol else {
        panic!("expected a method");
    };
    assert_eq!(synthesized.core.provenance, Provenance::SynthesizedForCompatibility);
    assert_eq!(synthesized.widens.as_ref(), Some(out[0].symbol.id()));
    assert_eq!(synthesized.core.id.declaring_type, "Ns.Dog");
    assert!(synthesized.flags.contains(MemberFlags::OVERRIDE));
    assert_eq!(codes(&pass), vec![dc::OVERLOAD_SYNTHESIZED]);
}

#[test]
fn test_existing_wide_overload_is_not_duplicated() {
    let animal = class("Ns.Animal").with_member(method("Clone", local("Ns.Animal")));
    let dog = class("Ns.Dog")
        .with_base(local("Ns.Animal"))
        .with_member(method("Clone", local("Ns.Dog")))
        .with_member(method("Clone", local("Ns.Animal")));
    let (out, pass) = reconciled(vec![animal, dog], "Ns.Dog");
    assert_eq!(out.len(), 2);
    assert!(pass.sink.is_empty());
}

#[test]
fn test_interface_method_gets_compatibility_overload() {
    let shape = interface("Ns.IShape").with_member(method("Copy", local("Ns.IShape")));
    let circle = class("Ns.Circle")
        .with_interface(local("Ns.IShape"))
        .with_member(method("Copy", local("Ns.Circle")));
    let (out, pass) = reconciled(vec![shape, circle], "Ns.Circle");
    assert_eq!(returns(&out), vec!["Ns.Circle", "Ns.IShape"]);
    assert_eq!(codes(&pass), vec![dc::OVERLOAD_SYNTHESIZED]);
}

#[test]
fn test_same_return_after_substitution_is_not_covariant() {
    let source = interface("Ns.ISource`1")
        .with_generic_parameter(GenericParameterDecl::new("T", 0))
        .with_member(method("Next", TypeReference::generic_parameter("Ns.ISource`1", "T", 0)));
    let reader = class("Ns.Reader")
        .with_interface(TypeReference::generic(CORE, "Ns.ISource`1", vec![string()]))
        .with_member(method("Next", string()));
    let (out, pass) = reconciled(vec![source, reader], "Ns.Reader");
    assert_eq!(out.len(), 1);
    assert!(pass.sink.is_empty());
}

#[test]
fn test_unbound_ancestor_parameter_is_unrepresentable() {
    let producer = interface("Ns.IProducer`1")
        .with_generic_parameter(GenericParameterDecl::new("T", 0))
        .with_member(method("Make", TypeReference::generic_parameter("Ns.IProducer`1", "T", 0)));
    let maker = class("Ns.Maker")
        .with_interface(local("Ns.IProducer`1"))
        .with_member(method("Make", string()));
    let (out, pass) = reconciled(vec![producer, maker], "Ns.Maker");
    assert_eq!(out.len(), 1);
    assert_eq!(codes(&pass), vec![dc::COVARIANT_OVERLOAD_UNREPRESENTABLE]);
}

#[test]
fn test_covariant_property_is_kept_and_reported() {
    let animal = class("Ns.Animal");
    let dog = class("Ns.Dog").with_base(local("Ns.Animal"));
    let owner = class("Ns.Owner").with_member(SourceMember::property("Pet", local("Ns.Animal")));
    let dog_owner = class("Ns.DogOwner")
        .with_base(local("Ns.Owner"))
        .with_member(SourceMember::property("Pet", local("Ns.Dog")));
    let (out, pass) = reconciled(vec![animal, dog, owner, dog_owner], "Ns.DogOwner");
    assert_eq!(out.len(), 1);
    assert_eq!(codes(&pass), vec![dc::PROPERTY_COVARIANCE_ACCEPTED]);
    let diagnostic = &pass.sink.diagnostics()[0];
    assert!(diagnostic.message.contains("Core:Ns.DogOwner::Pet(): Ns.Dog"));
}

#[test]
fn test_statics_are_not_reconciled() {
    let animal = class("Ns.Animal").with_member(method("Create", local("Ns.Animal")));
    let dog = class("Ns.Dog")
        .with_base(local("Ns.Animal"))
        .with_member(method("Create", local("Ns.Dog")).with_flags(MemberFlags::STATIC));
    let loader = loader(vec![animal, dog]);
    let (out, pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.Dog", |mapper| {
        let ty = lookup(mapper, "Ns.Dog");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        let declared = capture_declared(mapper, ty, &ancestry).unwrap();
        reconcile(mapper, ty, &ancestry, declared.statics).unwrap()
    });
    assert_eq!(out.len(), 1);
    assert!(pass.sink.is_empty());
}

#[test]
fn test_reconciling_twice_matches_reconciling_once() {
    let animal = class("Ns.Animal").with_member(method("Clone", local("Ns.Animal")));
    let dog = class("Ns.Dog")
        .with_base(local("Ns.Animal"))
        .with_member(method("Clone", local("Ns.Dog")).with_flags(MemberFlags::OVERRIDE));
    let loader = loader(vec![animal, dog]);
    let ((once, twice), pass) = with_mapper(&loader, &EngineOptions::new(), "Ns.Dog", |mapper| {
        let ty = lookup(mapper, "Ns.Dog");
        let ancestry = mapper.catalog().ancestry(ty, &mut mapper.pass().sink);
        let declared = capture_declared(mapper, ty, &ancestry).unwrap();
        let first = reconcile(mapper, ty, &ancestry, declared.instance).unwrap();
        let once = returns(&first);
        let second = reconcile(mapper, ty, &ancestry, first).unwrap();
        (once, returns(&second))
    });
    assert_eq!(once, vec!["Ns.Dog", "Ns.Animal"]);
    assert_eq!(twice, once);
    assert_eq!(codes(&pass), vec![dc::OVERLOAD_SYNTHESIZED]);
}
