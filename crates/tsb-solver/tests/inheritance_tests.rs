//! Heritage handling across whole modules: diamonds, covariant returns,
//! views and flattening.

mod support;

use support::*;
use tsb_common::diagnostic_codes as dc;
use tsb_model::{
    Declaration, GenericParameterDecl, MemberFlags, Provenance, SourceMember, SourceType,
    TypeReference, Visibility,
};

fn diamond(extra: Vec<SourceType>) -> Vec<SourceType> {
    let mut types = vec![
        interface("Ns.IBase").with_member(SourceMember::property("Id", int())),
        interface("Ns.ILeft")
            .with_interface(local("Ns.IBase"))
            .with_member(method("Left", void())),
        interface("Ns.IRight")
            .with_interface(local("Ns.IBase"))
            .with_member(method("Right", void())),
        class("Ns.Both")
            .with_interface(local("Ns.ILeft"))
            .with_interface(local("Ns.IRight")),
        class("Ns.Twin")
            .with_interface(local("Ns.IRight"))
            .with_interface(local("Ns.ILeft")),
    ];
    types.extend(extra);
    types
}

fn heritage_texts(texts: &[tsb_model::TypeText]) -> Vec<&str> {
    texts.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn test_diamond_folds_into_single_alias() {
    let output = run(diamond(Vec::new()));

    assert_eq!(heritage_texts(&class_decl(&output, "Ns", "Both").implements), vec!["ILeft_And_IRight"]);
    assert_eq!(heritage_texts(&class_decl(&output, "Ns", "Twin").implements), vec!["ILeft_And_IRight"]);

    let names = declaration_names(&output, "Ns");
    assert_eq!(names.last().map(String::as_str), Some("ILeft_And_IRight"));
    let aliases: Vec<_> = output
        .namespace("Ns")
        .unwrap()
        .declarations()
        .iter()
        .filter_map(|d| match d {
            Declaration::IntersectionAlias(alias) => Some(alias),
            _ => None,
        })
        .collect();
    assert_eq!(aliases.len(), 1);
    assert_eq!(heritage_texts(&aliases[0].constituents), vec!["ILeft", "IRight"]);

    assert!(interface_decl(&output, "Ns", "IBase").diamond_base);
    assert!(!interface_decl(&output, "Ns", "ILeft").diamond_base);
    assert_eq!(heritage_texts(&interface_decl(&output, "Ns", "ILeft").extends), vec!["IBase"]);
    assert_eq!(count(&output, dc::DIAMOND_RESOLVED), 2);

    let mut members = member_names(declaration(&output, "Ns", "Both"));
    members.sort_unstable();
    assert_eq!(members, vec!["Id", "Left", "Right"]);
}

#[test]
fn test_referenced_diamond_base_stays_exported() {
    let user = class("Ns.User").with_member(SourceMember::property("Base", local("Ns.IBase")));
    let output = run(diamond(vec![user]));
    assert!(!interface_decl(&output, "Ns", "IBase").diamond_base);
    assert_eq!(count(&output, dc::DIAMOND_RESOLVED), 2);
}

#[test]
fn test_covariant_override_gets_compatibility_overload() {
    let animal = class("Ns.Animal").with_member(method("Clone", local("Ns.Animal")));
    let dog = class("Ns.Dog")
        .with_base(local("Ns.Animal"))
        .with_member(method("Clone", local("Ns.Dog")).with_flags(MemberFlags::OVERRIDE));
    let output = run(vec![animal, dog]);

    let dog = class_decl(&output, "Ns", "Dog");
    assert_eq!(dog.base.as_ref().map(|b| b.text.as_str()), Some("Animal"));
    let signatures: Vec<_> = dog.members.iter().map(|m| (m.name(), m.ty.as_str())).collect();
    assert_eq!(signatures, vec![("Clone", "Dog"), ("Clone", "Animal")]);
    assert_eq!(dog.members[1].symbol.provenance(), Provenance::SynthesizedForCompatibility);
    assert_eq!(count(&output, dc::OVERLOAD_SYNTHESIZED), 1);
}

#[test]
fn test_declared_wide_overload_suppresses_synthesis() {
    let animal = class("Ns.Animal").with_member(method("Clone", local("Ns.Animal")));
    let dog = class("Ns.Dog")
        .with_base(local("Ns.Animal"))
        .with_member(method("Clone", local("Ns.Dog")))
        .with_member(method("Clone", local("Ns.Animal")));
    let output = run(vec![animal, dog]);
    assert_eq!(class_decl(&output, "Ns", "Dog").members.len(), 2);
    assert_eq!(count(&output, dc::OVERLOAD_SYNTHESIZED), 0);
}

#[test]
fn test_interface_implementation_gets_compatibility_overload() {
    let shape = interface("Ns.IShape").with_member(method("Copy", local("Ns.IShape")));
    let circle = class("Ns.Circle")
        .with_interface(local("Ns.IShape"))
        .with_member(method("Copy", local("Ns.Circle")));
    let output = run(vec![shape, circle]);

    let circle = class_decl(&output, "Ns", "Circle");
    let types: Vec<_> = circle.members.iter().map(|m| m.ty.as_str()).collect();
    assert_eq!(types, vec!["Circle", "IShape"]);
    assert_eq!(heritage_texts(&circle.implements), vec!["IShape"]);
}

#[test]
fn test_redundant_property_redeclaration_is_elided() {
    let base = class("Ns.BaseWidget").with_member(SourceMember::property("Name", string()));
    let widget = class("Ns.Widget")
        .with_base(local("Ns.BaseWidget"))
        .with_member(SourceMember::property("Name", string()))
        .with_member(SourceMember::property("Size", int()));
    let output = run(vec![base, widget]);
    assert_eq!(member_names(declaration(&output, "Ns", "Widget")), vec!["Size"]);
    assert_eq!(member_names(declaration(&output, "Ns", "BaseWidget")), vec!["Name"]);
    assert_eq!(count(&output, dc::REDUNDANT_PROPERTY_ELIDED), 1);
}

#[test]
fn test_conflicting_explicit_implementations_produce_view() {
    let readable = interface("Ns.IReadable").with_member(method("Get", string()));
    let writable = interface("Ns.IWritable")
        .with_member(method("Get", int()))
        .with_member(method_with("Put", vec![("value", int())], void()));
    let repository = class("Ns.Repository")
        .with_interface(local("Ns.IReadable"))
        .with_interface(local("Ns.IWritable"))
        .with_member(
            method("Get", string())
                .with_visibility(Visibility::Private)
                .explicit_for(local("Ns.IReadable")),
        )
        .with_member(
            method("Get", int())
                .with_visibility(Visibility::Private)
                .explicit_for(local("Ns.IWritable")),
        );
    let output = run(vec![readable, writable, repository]);

    let class = class_decl(&output, "Ns", "Repository");
    assert_eq!(class.members.len(), 1);
    assert_eq!(class.members[0].ty, "string");
    assert_eq!(heritage_texts(&class.implements), vec!["IReadable"]);
    assert_eq!(class.views.len(), 1);
    assert_eq!(class.views[0].property, "As_IWritable");
    assert_eq!(class.views[0].view, "Repository_As_IWritable");
    assert_eq!(class.views[0].type_text, "Repository_As_IWritable");

    let view = interface_decl(&output, "Ns", "Repository_As_IWritable");
    assert_eq!(view.view_of.as_deref(), Some("Ns.Repository"));
    let members: Vec<_> = view.members.iter().map(|m| (m.name(), m.ty.as_str())).collect();
    assert_eq!(members, vec![("Get", "int"), ("Put", "void")]);

    assert_eq!(
        declaration_names(&output, "Ns"),
        vec!["IReadable", "IWritable", "Repository", "Repository_As_IWritable"]
    );
    assert_eq!(count(&output, dc::MEMBER_NAME_CONFLICT), 1);
    assert_eq!(count(&output, dc::MEMBER_DEMOTED_TO_VIEW), 1);
}

#[test]
fn test_hidden_generic_base_is_flattened_with_arguments() {
    let holder = class("Ns.Holder`1")
        .with_visibility(Visibility::Internal)
        .with_generic_parameter(GenericParameterDecl::new("T", 0))
        .with_member(method("Value", TypeReference::generic_parameter("Ns.Holder`1", "T", 0)));
    let strings = class("Ns.StringHolder").with_base(TypeReference::generic(CORE, "Ns.Holder`1", vec![string()]));
    let output = run(vec![holder, strings]);

    assert_eq!(declaration_names(&output, "Ns"), vec!["StringHolder"]);
    let strings = class_decl(&output, "Ns", "StringHolder");
    assert!(strings.base.is_none());
    assert_eq!(strings.members[0].name(), "Value");
    assert_eq!(strings.members[0].ty, "string");
    assert_eq!(strings.members[0].symbol.provenance(), Provenance::Inherited);
}

#[test]
fn test_emitted_generic_base_keeps_arguments() {
    let list = class("Ns.List`1").with_generic_parameter(GenericParameterDecl::new("T", 0));
    let ints = class("Ns.IntList").with_base(TypeReference::generic(CORE, "Ns.List`1", vec![int()]));
    let output = run(vec![list, ints]);
    let ints = class_decl(&output, "Ns", "IntList");
    assert_eq!(ints.base.as_ref().map(|b| b.text.as_str()), Some("List_1<int>"));
}

#[test]
fn test_hidden_interface_is_replaced_by_its_parents() {
    let visible = interface("Ns.IVisible").with_member(method("Show", void()));
    let hidden = interface("Ns.IHidden")
        .with_visibility(Visibility::Internal)
        .with_interface(local("Ns.IVisible"));
    let widget = class("Ns.Panel").with_interface(local("Ns.IHidden"));
    let output = run(vec![visible, hidden, widget]);

    let panel = class_decl(&output, "Ns", "Panel");
    assert_eq!(heritage_texts(&panel.implements), vec!["IVisible"]);
    assert_eq!(member_names(declaration(&output, "Ns", "Panel")), vec!["Show"]);
}
