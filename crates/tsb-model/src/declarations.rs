//! Declarations
//!
//! Declarations are assembled bottom-up (members → declaration → namespace).
//! A namespace accepts ordinary declarations until [`NamespaceDecl::seal_ordinary`];
//! after that only synthesized intersection aliases may be appended, and
//! after [`NamespaceDecl::finalize`] nothing changes.

use crate::symbols::Symbol;
use crate::types::TypeReference;
use serde::Serialize;
use thiserror::Error;

/// A type reference together with its rendered target text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeText {
    pub reference: TypeReference,
    pub text: String,
}

impl TypeText {
    pub fn new(reference: TypeReference, text: impl Into<String>) -> Self {
        Self {
            reference,
            text: text.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub optional: bool,
    pub rest: bool,
}

/// A named symbol and its rendered signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDecl {
    pub symbol: Symbol,
    /// Rendered type parameters (`T extends IComparable_1<T>`).
    pub type_parameters: Vec<String>,
    pub parameters: Vec<ParameterDecl>,
    /// Value type of fields, properties and events; return type of methods.
    /// Empty for constructors.
    #[serde(rename = "type")]
    pub ty: String,
}

impl MemberDecl {
    /// The emitted name. Only named members are ever placed on a declaration.
    pub fn name(&self) -> &str {
        self.symbol.emitted_name().unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDecl {
    pub name: String,
    /// Self reference with the type's own parameters as arguments.
    pub source: TypeReference,
    pub type_parameters: Vec<String>,
    pub base: Option<TypeText>,
    pub implements: Vec<TypeText>,
    pub members: Vec<MemberDecl>,
    pub companion: Option<StaticNamespaceDecl>,
    pub views: Vec<ViewAccessor>,
    pub is_abstract: bool,
    pub is_struct: bool,
}

/// Accessor on a class surface leading to one of its views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewAccessor {
    /// Property name on the class (`As_IWritable`).
    pub property: String,
    /// Name of the generated view interface in the same namespace.
    pub view: String,
    pub interface: TypeReference,
    /// Rendered accessor type (`Repository_As_IWritable<T>`).
    pub type_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    pub name: String,
    pub source: TypeReference,
    pub type_parameters: Vec<String>,
    pub extends: Vec<TypeText>,
    pub members: Vec<MemberDecl>,
    /// Only referenced from intersection aliases; emitted without `export`.
    pub diamond_base: bool,
    /// Full name of the class this interface is a generated view of.
    pub view_of: Option<String>,
    pub companion: Option<StaticNamespaceDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMember {
    pub source_name: String,
    pub emitted_name: String,
    pub value: crate::symbols::ConstantValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDecl {
    pub name: String,
    pub source: TypeReference,
    /// Rendered underlying integral alias.
    pub underlying: String,
    pub members: Vec<EnumMember>,
    pub is_flags: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionAlias {
    pub name: String,
    /// Sorted canonical constituent names; aliases with equal keys are one alias.
    pub key: Vec<String>,
    /// Type parameters the constituents mention, in order of first use.
    pub type_parameters: Vec<String>,
    pub constituents: Vec<TypeText>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticNamespaceDecl {
    pub name: String,
    pub source: TypeReference,
    pub members: Vec<MemberDecl>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Class,
    Interface,
    Enum,
    IntersectionAlias,
    StaticNamespace,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    IntersectionAlias(IntersectionAlias),
    StaticNamespace(StaticNamespaceDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Class(d) => &d.name,
            Self::Interface(d) => &d.name,
            Self::Enum(d) => &d.name,
            Self::IntersectionAlias(d) => &d.name,
            Self::StaticNamespace(d) => &d.name,
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            Self::Class(_) => DeclarationKind::Class,
            Self::Interface(_) => DeclarationKind::Interface,
            Self::Enum(_) => DeclarationKind::Enum,
            Self::IntersectionAlias(_) => DeclarationKind::IntersectionAlias,
            Self::StaticNamespace(_) => DeclarationKind::StaticNamespace,
        }
    }

    /// Full name of the source type, when the declaration has one.
    pub fn source_full_name(&self) -> Option<&str> {
        match self {
            Self::Class(d) => d.source.full_name(),
            Self::Interface(d) => d.source.full_name(),
            Self::Enum(d) => d.source.full_name(),
            Self::StaticNamespace(d) => d.source.full_name(),
            Self::IntersectionAlias(_) => None,
        }
    }

    pub fn members(&self) -> &[MemberDecl] {
        match self {
            Self::Class(d) => &d.members,
            Self::Interface(d) => &d.members,
            Self::StaticNamespace(d) => &d.members,
            Self::Enum(_) | Self::IntersectionAlias(_) => &[],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
enum NamespaceState {
    Open,
    Sealed,
    Finalized,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("namespace '{namespace}' already declares '{name}'")]
    DuplicateName { namespace: String, name: String },
    #[error("namespace '{namespace}' is sealed; only intersection aliases may be added")]
    Sealed { namespace: String },
    #[error("namespace '{namespace}' is finalized")]
    Finalized { namespace: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDecl {
    pub name: String,
    pub emitted_name: String,
    declarations: Vec<Declaration>,
    #[serde(skip)]
    state: NamespaceState,
}

impl NamespaceDecl {
    pub fn new(name: impl Into<String>, emitted_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emitted_name: emitted_name.into(),
            declarations: Vec::new(),
            state: NamespaceState::Open,
        }
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn is_finalized(&self) -> bool {
        self.state == NamespaceState::Finalized
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.declarations.iter().any(|d| d.name() == name)
    }

    /// Append an ordinary declaration.
    pub fn push(&mut self, declaration: Declaration) -> Result<(), NamespaceError> {
        match self.state {
            NamespaceState::Open => {}
            NamespaceState::Sealed => {
                return Err(NamespaceError::Sealed {
                    namespace: self.name.clone(),
                });
            }
            NamespaceState::Finalized => {
                return Err(NamespaceError::Finalized {
                    namespace: self.name.clone(),
                });
            }
        }
        self.insert(declaration)
    }

    /// Close the namespace to ordinary declarations.
    pub fn seal_ordinary(&mut self) {
        if self.state == NamespaceState::Open {
            self.state = NamespaceState::Sealed;
        }
    }

    /// Late insertion of a synthesized intersection alias.
    pub fn push_alias(&mut self, alias: IntersectionAlias) -> Result<(), NamespaceError> {
        if self.state == NamespaceState::Finalized {
            return Err(NamespaceError::Finalized {
                namespace: self.name.clone(),
            });
        }
        self.insert(Declaration::IntersectionAlias(alias))
    }

    /// Mark an interface declared here as a diamond base. Returns whether
    /// a matching interface was found.
    pub fn mark_diamond_base(&mut self, full_name: &str) -> bool {
        if self.state == NamespaceState::Finalized {
            return false;
        }
        for declaration in &mut self.declarations {
            if let Declaration::Interface(iface) = declaration {
                if iface.view_of.is_none() && iface.source.full_name() == Some(full_name) {
                    iface.diamond_base = true;
                    return true;
                }
            }
        }
        false
    }

    pub fn finalize(&mut self) {
        self.state = NamespaceState::Finalized;
    }

    fn insert(&mut self, declaration: Declaration) -> Result<(), NamespaceError> {
        if self.contains_name(declaration.name()) {
            return Err(NamespaceError::DuplicateName {
                namespace: self.name.clone(),
                name: declaration.name().to_string(),
            });
        }
        self.declarations.push(declaration);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/declarations_tests.rs"]
mod tests;
