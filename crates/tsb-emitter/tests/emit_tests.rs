//! End-to-end printing: engine output rendered to declaration text.

use tsb_emitter::{DeclarationPrinter, RunSummary};
use tsb_model::{
    InMemoryLoader, LoadedModule, Parameter, SourceMember, SourceType, TypeReference, Visibility,
};
use tsb_solver::{BindingEngine, EngineOptions, ModuleOutput};

const CORE: &str = "Core";

fn sys(name: &str) -> TypeReference {
    TypeReference::named(CORE, format!("System.{name}"))
}

fn local(full_name: &str) -> TypeReference {
    TypeReference::named(CORE, full_name)
}

fn method(name: &str, parameters: Vec<(&str, TypeReference)>, ret: TypeReference) -> SourceMember {
    let parameters = parameters
        .into_iter()
        .map(|(n, ty)| Parameter::new(n, ty))
        .collect();
    SourceMember::method(name, parameters, ret)
}

fn generate(loader: &InMemoryLoader) -> ModuleOutput {
    BindingEngine::new(loader, EngineOptions::new())
        .generate(CORE)
        .expect("core module loads")
}

fn core(types: Vec<SourceType>) -> LoadedModule {
    types
        .into_iter()
        .fold(LoadedModule::new(CORE), LoadedModule::with_type)
}

fn print(output: &ModuleOutput) -> String {
    DeclarationPrinter::new().without_prelude().print(output)
}

#[test]
fn test_foreign_references_are_imported_once() {
    let gadget = TypeReference::named("Other", "OtherNs.Gadget");
    let user = SourceType::class(CORE, "Ns.User")
        .with_member(SourceMember::property("Current", gadget.clone()))
        .with_member(method("Make", Vec::new(), gadget.clone()))
        .with_member(method("Use", vec![("gadget", gadget)], sys("Void")));
    let loader = InMemoryLoader::new()
        .with_module(core(vec![user]))
        .with_module(LoadedModule::new("Other").with_type(SourceType::class("Other", "OtherNs.Gadget")));
    let printed = print(&generate(&loader));

    assert_eq!(printed.matches("import * as").count(), 1);
    assert!(printed.contains("import * as Other from \"Other\";\n"), "{printed}");
    let expected = "\
export namespace Ns {
    export class User {
        readonly Current: Other.OtherNs.Gadget;
        Make(): Other.OtherNs.Gadget;
        Use(gadget: Other.OtherNs.Gadget): void;
    }
}
";
    assert!(printed.ends_with(expected), "{printed}");
}

#[test]
fn test_diamond_prints_hidden_base_and_alias() {
    let types = vec![
        SourceType::interface(CORE, "Ns.IBase").with_member(SourceMember::property("Id", sys("Int32"))),
        SourceType::interface(CORE, "Ns.ILeft")
            .with_interface(local("Ns.IBase"))
            .with_member(method("Left", Vec::new(), sys("Void"))),
        SourceType::interface(CORE, "Ns.IRight")
            .with_interface(local("Ns.IBase"))
            .with_member(method("Right", Vec::new(), sys("Void"))),
        SourceType::class(CORE, "Ns.Both")
            .with_interface(local("Ns.ILeft"))
            .with_interface(local("Ns.IRight")),
    ];
    let printed = print(&generate(&InMemoryLoader::new().with_module(core(types))));

    assert!(printed.contains("\n    interface IBase {\n        readonly Id: int;\n    }\n"), "{printed}");
    assert!(!printed.contains("export interface IBase"));
    assert!(printed.contains("\n    export interface ILeft extends IBase {\n        Left(): void;\n    }\n"));
    assert!(printed.contains("export class Both implements ILeft_And_IRight {"));
    assert!(printed.ends_with("    export type ILeft_And_IRight = ILeft & IRight;\n}\n"), "{printed}");
}

#[test]
fn test_conflicting_implementations_print_view_accessor() {
    let readable = SourceType::interface(CORE, "Ns.IReadable").with_member(method("Get", Vec::new(), sys("String")));
    let writable = SourceType::interface(CORE, "Ns.IWritable")
        .with_member(method("Get", Vec::new(), sys("Int32")))
        .with_member(method("Put", vec![("value", sys("Int32"))], sys("Void")));
    let repository = SourceType::class(CORE, "Ns.Repository")
        .with_interface(local("Ns.IReadable"))
        .with_interface(local("Ns.IWritable"))
        .with_member(
            method("Get", Vec::new(), sys("String"))
                .with_visibility(Visibility::Private)
                .explicit_for(local("Ns.IReadable")),
        )
        .with_member(
            method("Get", Vec::new(), sys("Int32"))
                .with_visibility(Visibility::Private)
                .explicit_for(local("Ns.IWritable")),
        );
    let output = generate(&InMemoryLoader::new().with_module(core(vec![readable, writable, repository])));
    let printed = print(&output);

    let class = "\
    export class Repository implements IReadable {
        Get(): string;
        readonly As_IWritable: Repository_As_IWritable;
    }
";
    assert!(printed.contains(class), "{printed}");
    let view = "\
    export interface Repository_As_IWritable {
        Get(): int;
        Put(value: int): void;
    }
";
    assert!(printed.contains(view), "{printed}");

    let summary = RunSummary::from_outputs(0, [&output]);
    assert_eq!(summary.counts.views, 1);
    assert_eq!(summary.counts.interfaces, 2);
    assert_eq!(summary.counts.classes, 1);
    assert!(summary.warnings.iter().any(|w| w.contains("TSB6001")));
}

#[test]
fn test_printing_is_deterministic() {
    let types = || {
        vec![
            SourceType::class(CORE, "Zeta.Last").with_member(method("Run", Vec::new(), sys("Void"))),
            SourceType::class(CORE, "Alpha.First").with_member(SourceMember::property("Name", sys("String"))),
        ]
    };
    let first = DeclarationPrinter::new().print(&generate(&InMemoryLoader::new().with_module(core(types()))));
    let second = DeclarationPrinter::new().print(&generate(&InMemoryLoader::new().with_module(core(types()))));
    assert_eq!(first, second);
    let alpha = first.find("export namespace Alpha").unwrap();
    let zeta = first.find("export namespace Zeta").unwrap();
    assert!(alpha < zeta);
}
