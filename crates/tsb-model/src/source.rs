//! Input model
//!
//! The loader-facing description of one module's types. A [`ModuleLoader`]
//! supplies the exported types of a module together with its forwarded
//! entries, and answers cross-module lookups while a module is processed.

use crate::symbols::{ConstantValue, GenericParameterDecl, MemberFlags, Parameter, SymbolKind, Visibility};
use crate::types::{NamedType, TypeReference, split_full_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Class,
    Struct,
    Interface,
    Enum,
    StaticClass,
    Delegate,
}

impl SourceKind {
    pub const fn is_interface_like(self) -> bool {
        matches!(self, Self::Interface | Self::Delegate)
    }

    pub const fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::Enum)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMember {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub flags: MemberFlags,
    /// Field, property and event type, or method return type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeReference>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub index_parameters: Vec<Parameter>,
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameterDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<ConstantValue>,
    /// Set for explicit interface implementations (`IFoo.Bar`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_interface: Option<TypeReference>,
    #[serde(default = "default_true")]
    pub has_getter: bool,
    #[serde(default)]
    pub has_setter: bool,
}

impl SourceMember {
    fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            flags: MemberFlags::empty(),
            ty: None,
            parameters: Vec::new(),
            index_parameters: Vec::new(),
            generic_parameters: Vec::new(),
            constant: None,
            explicit_interface: None,
            has_getter: true,
            has_setter: false,
        }
    }

    pub fn constructor(parameters: Vec<Parameter>) -> Self {
        Self {
            parameters,
            ..Self::new(".ctor", SymbolKind::Constructor)
        }
    }

    pub fn method(name: impl Into<String>, parameters: Vec<Parameter>, ret: TypeReference) -> Self {
        Self {
            parameters,
            ty: Some(ret),
            ..Self::new(name, SymbolKind::Method)
        }
    }

    pub fn property(name: impl Into<String>, ty: TypeReference) -> Self {
        Self {
            ty: Some(ty),
            ..Self::new(name, SymbolKind::Property)
        }
    }

    pub fn indexer(index_parameters: Vec<Parameter>, ty: TypeReference) -> Self {
        Self {
            ty: Some(ty),
            index_parameters,
            ..Self::new("Item", SymbolKind::Property)
        }
    }

    pub fn field(name: impl Into<String>, ty: TypeReference) -> Self {
        Self {
            ty: Some(ty),
            ..Self::new(name, SymbolKind::Field)
        }
    }

    pub fn event(name: impl Into<String>, handler: TypeReference) -> Self {
        Self {
            ty: Some(handler),
            ..Self::new(name, SymbolKind::Event)
        }
    }

    pub fn with_flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_setter(mut self) -> Self {
        self.has_setter = true;
        self
    }

    pub fn with_constant(mut self, value: ConstantValue) -> Self {
        self.constant = Some(value);
        self.flags |= MemberFlags::CONST | MemberFlags::STATIC;
        self
    }

    pub fn with_generic_parameter(mut self, parameter: GenericParameterDecl) -> Self {
        self.generic_parameters.push(parameter);
        self
    }

    pub fn explicit_for(mut self, interface: TypeReference) -> Self {
        self.explicit_interface = Some(interface);
        self
    }

    /// Return type of a method, declared type otherwise. Constructors and
    /// members without a type map to `System.Void`.
    pub fn ty_or_void(&self, module: &str) -> TypeReference {
        self.ty
            .clone()
            .unwrap_or_else(|| TypeReference::named(module, "System.Void"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceType {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    pub full_name: String,
    pub kind: SourceKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameterDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeReference>,
    #[serde(default)]
    pub interfaces: Vec<TypeReference>,
    #[serde(default)]
    pub members: Vec<SourceMember>,
    /// Full name of the declaring type for nested types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_underlying: Option<TypeReference>,
    #[serde(default)]
    pub is_flags: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_sealed: bool,
}

impl SourceType {
    pub fn new(module: impl Into<String>, full_name: impl Into<String>, kind: SourceKind) -> Self {
        let full_name = full_name.into();
        let (namespace, name) = split_full_name(&full_name);
        let declaring_type = full_name
            .rsplit_once(crate::types::NESTED_SEPARATOR)
            .map(|(outer, _)| outer.to_string());
        Self {
            module: module.into(),
            namespace,
            name,
            full_name,
            kind,
            visibility: Visibility::Public,
            generic_parameters: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            declaring_type,
            enum_underlying: None,
            is_flags: false,
            is_abstract: false,
            is_sealed: false,
        }
    }

    pub fn class(module: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::new(module, full_name, SourceKind::Class)
    }

    pub fn interface(module: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(module, full_name, SourceKind::Interface)
        }
    }

    pub fn enumeration(module: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::new(module, full_name, SourceKind::Enum)
    }

    /// Fill the fields a loader may leave empty (module, namespace, simple
    /// name, declaring type) from the module name and full name.
    pub fn normalized(mut self, module: &str) -> Self {
        if self.module.is_empty() {
            self.module = module.to_string();
        }
        if self.name.is_empty() {
            let (namespace, name) = split_full_name(&self.full_name);
            self.namespace = namespace;
            self.name = name;
        }
        if self.declaring_type.is_none() {
            self.declaring_type = self
                .full_name
                .rsplit_once(crate::types::NESTED_SEPARATOR)
                .map(|(outer, _)| outer.to_string());
        }
        for (position, parameter) in self.generic_parameters.iter_mut().enumerate() {
            parameter.position = position as u32;
        }
        self
    }

    pub fn with_generic_parameter(mut self, parameter: GenericParameterDecl) -> Self {
        self.generic_parameters.push(parameter);
        self
    }

    pub fn with_base(mut self, base: TypeReference) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_interface(mut self, interface: TypeReference) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_member(mut self, member: SourceMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Reference to this type with its own type parameters as arguments.
    pub fn self_reference(&self) -> TypeReference {
        let mut named = NamedType::new(self.module.clone(), self.full_name.clone());
        named.is_value_type = self.kind.is_value_type();
        named.type_arguments = self
            .generic_parameters
            .iter()
            .map(|p| p.reference(&self.full_name))
            .collect();
        match &self.declaring_type {
            Some(outer) => {
                TypeReference::nested(TypeReference::named(self.module.clone(), outer.clone()), named)
            }
            None => TypeReference::Named(named),
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == SourceKind::Interface
    }
}

/// Result of loading one forwarded entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForwardOutcome {
    Loaded(SourceType),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardedType {
    pub full_name: String,
    pub target_module: String,
    pub outcome: ForwardOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedModule {
    pub name: String,
    #[serde(default)]
    pub types: Vec<SourceType>,
    #[serde(default)]
    pub forwarded: Vec<ForwardedType>,
}

impl LoadedModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            forwarded: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: SourceType) -> Self {
        self.types.push(ty);
        self
    }

    pub fn with_forwarded(mut self, forwarded: ForwardedType) -> Self {
        self.forwarded.push(forwarded);
        self
    }

    /// Normalize every type against this module's name.
    pub fn normalized(mut self) -> Self {
        let name = self.name.clone();
        self.types = self.types.into_iter().map(|t| t.normalized(&name)).collect();
        for forwarded in &mut self.forwarded {
            if let ForwardOutcome::Loaded(ty) = &mut forwarded.outcome {
                *ty = ty.clone().normalized(&forwarded.target_module);
            }
        }
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("module '{0}' was not found")]
    NotFound(String),
    #[error("module '{module}' could not be read: {message}")]
    Io { module: String, message: String },
    #[error("module '{module}' is malformed: {message}")]
    Malformed { module: String, message: String },
}

/// Supplies modules and answers cross-module lookups.
pub trait ModuleLoader {
    fn load_module(&self, name: &str) -> Result<LoadedModule, LoadError>;

    /// Locate a type declared (not forwarded) by `module`.
    fn find_type(&self, module: &str, full_name: &str) -> Option<&SourceType>;

    /// Module a forwarded entry of `module` points at.
    fn forwarded_to(&self, _module: &str, _full_name: &str) -> Option<&str> {
        None
    }
}

/// Loader over modules held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLoader {
    modules: BTreeMap<String, LoadedModule>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: LoadedModule) {
        let module = module.normalized();
        trace!(module = %module.name, types = module.types.len(), "registering module");
        self.modules.insert(module.name.clone(), module);
    }

    pub fn with_module(mut self, module: LoadedModule) -> Self {
        self.insert(module);
        self
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

impl ModuleLoader for InMemoryLoader {
    fn load_module(&self, name: &str) -> Result<LoadedModule, LoadError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }

    fn find_type(&self, module: &str, full_name: &str) -> Option<&SourceType> {
        self.modules
            .get(module)?
            .types
            .iter()
            .find(|t| t.full_name == full_name)
    }

    fn forwarded_to(&self, module: &str, full_name: &str) -> Option<&str> {
        self.modules
            .get(module)?
            .forwarded
            .iter()
            .find(|f| f.full_name == full_name)
            .map(|f| f.target_module.as_str())
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
