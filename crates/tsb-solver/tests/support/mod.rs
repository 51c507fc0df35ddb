//! Builders shared by the engine integration tests.
#![allow(dead_code)]

use tsb_model::{
    ClassDecl, Declaration, InMemoryLoader, InterfaceDecl, LoadedModule, Parameter, SourceMember,
    SourceType, TypeReference,
};
use tsb_solver::{BindingEngine, EngineOptions, ModuleOutput};

pub const CORE: &str = "Core";

pub fn sys(name: &str) -> TypeReference {
    TypeReference::named(CORE, format!("System.{name}"))
}

pub fn int() -> TypeReference {
    sys("Int32")
}

pub fn string() -> TypeReference {
    sys("String")
}

pub fn void() -> TypeReference {
    sys("Void")
}

pub fn local(full_name: &str) -> TypeReference {
    TypeReference::named(CORE, full_name)
}

pub fn method(name: &str, ret: TypeReference) -> SourceMember {
    SourceMember::method(name, Vec::new(), ret)
}

pub fn method_with(name: &str, parameters: Vec<(&str, TypeReference)>, ret: TypeReference) -> SourceMember {
    let parameters = parameters
        .into_iter()
        .map(|(n, ty)| Parameter::new(n, ty))
        .collect();
    SourceMember::method(name, parameters, ret)
}

pub fn class(full_name: &str) -> SourceType {
    SourceType::class(CORE, full_name)
}

pub fn interface(full_name: &str) -> SourceType {
    SourceType::interface(CORE, full_name)
}

pub fn core_module(types: Vec<SourceType>) -> LoadedModule {
    types
        .into_iter()
        .fold(LoadedModule::new(CORE), LoadedModule::with_type)
}

pub fn run_with(loader: &InMemoryLoader, options: EngineOptions) -> ModuleOutput {
    BindingEngine::new(loader, options)
        .generate(CORE)
        .expect("core module loads")
}

pub fn run(types: Vec<SourceType>) -> ModuleOutput {
    let loader = InMemoryLoader::new().with_module(core_module(types));
    run_with(&loader, EngineOptions::new())
}

pub fn declaration<'o>(output: &'o ModuleOutput, namespace: &str, name: &str) -> &'o Declaration {
    output
        .namespace(namespace)
        .and_then(|ns| ns.declarations().iter().find(|d| d.name() == name))
        .unwrap_or_else(|| panic!("no declaration '{name}' in '{namespace}'"))
}

pub fn class_decl<'o>(output: &'o ModuleOutput, namespace: &str, name: &str) -> &'o ClassDecl {
    match declaration(output, namespace, name) {
        Declaration::Class(class) => class,
        other => panic!("'{name}' is a {:?}, not a class", other.kind()),
    }
}

pub fn interface_decl<'o>(output: &'o ModuleOutput, namespace: &str, name: &str) -> &'o InterfaceDecl {
    match declaration(output, namespace, name) {
        Declaration::Interface(interface) => interface,
        other => panic!("'{name}' is a {:?}, not an interface", other.kind()),
    }
}

pub fn member_names(declaration: &Declaration) -> Vec<&str> {
    declaration.members().iter().map(|m| m.name()).collect()
}

pub fn declaration_names(output: &ModuleOutput, namespace: &str) -> Vec<String> {
    output
        .namespace(namespace)
        .map(|ns| ns.declarations().iter().map(|d| d.name().to_string()).collect())
        .unwrap_or_default()
}

pub fn count(output: &ModuleOutput, code: u32) -> usize {
    output.diagnostics_with_code(code).count()
}
