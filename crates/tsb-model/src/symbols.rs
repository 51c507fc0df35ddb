//! Symbol Model
//!
//! One immutable record per emitted member. Records are created while the
//! input type graph is traversed; afterwards the only changes are made through
//! the copy-with-one-field-changed constructors (`with_emitted_name`,
//! `with_scope`, `with_provenance`), which consume the old value.

use crate::stable_id::MemberStableId;
use crate::types::TypeReference;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MemberFlags: u16 {
        const STATIC = 1 << 0;
        const VIRTUAL = 1 << 1;
        const OVERRIDE = 1 << 2;
        const ABSTRACT = 1 << 3;
        const READONLY = 1 << 4;
        const CONST = 1 << 5;
    }
}

bitflags! {
    /// Constraints on a type parameter that are not type references.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SpecialConstraints: u8 {
        const REFERENCE_TYPE = 1 << 0;
        const VALUE_TYPE = 1 << 1;
        const DEFAULT_CONSTRUCTOR = 1 << 2;
        const UNMANAGED = 1 << 3;
    }
}

impl Default for MemberFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for SpecialConstraints {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

impl Visibility {
    /// Whether members of this visibility appear in the binding surface.
    pub const fn is_emitted(self) -> bool {
        matches!(self, Self::Public | Self::Protected)
    }
}

/// Why a member exists on a declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    Declared,
    Inherited,
    InterfaceSourced,
    SynthesizedForCompatibility,
}

/// Where a member is emitted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmitScope {
    ClassSurface,
    /// Demoted into the view generated for this interface.
    View(TypeReference),
}

/// Key of one name-reservation scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeKey {
    ClassSurface(String),
    View { owner: String, interface: String },
    Namespace(String),
}

impl ScopeKey {
    pub fn for_member(owner: &str, scope: &EmitScope) -> Self {
        match scope {
            EmitScope::ClassSurface => Self::ClassSurface(owner.to_string()),
            EmitScope::View(interface) => Self::View {
                owner: owner.to_string(),
                interface: interface.stable_key(),
            },
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassSurface(owner) => write!(f, "surface:{owner}"),
            Self::View { owner, interface } => write!(f, "view:{owner}/{interface}"),
            Self::Namespace(ns) => write!(f, "namespace:{ns}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Floating-point constants are kept in their source spelling.
    Float(String),
    Char(char),
    Str(String),
    Null,
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(text) => f.write_str(text),
            Self::Char(c) => write!(f, "{}", *c as u32),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Null => f.write_str("null"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Constructor,
    Field,
    Property,
    Event,
    Method,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emitted_name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeReference,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_params: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeReference) -> Self {
        Self {
            name: name.into(),
            emitted_name: None,
            ty,
            is_optional: false,
            is_params: false,
        }
    }

    pub fn with_emitted_name(self, name: impl Into<String>) -> Self {
        Self {
            emitted_name: Some(name.into()),
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericParameterDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emitted_name: Option<String>,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub constraints: Vec<TypeReference>,
    #[serde(default)]
    pub special: SpecialConstraints,
}

impl GenericParameterDecl {
    pub fn new(name: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            emitted_name: None,
            position,
            constraints: Vec::new(),
            special: SpecialConstraints::empty(),
        }
    }

    pub fn with_constraint(mut self, constraint: TypeReference) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Use-site reference to this parameter.
    pub fn reference(&self, owner: &str) -> TypeReference {
        TypeReference::generic_parameter(owner, self.name.clone(), self.position)
    }
}

/// Fields shared by every symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolCore {
    pub id: MemberStableId,
    pub source_name: String,
    /// Empty until the naming phase; non-empty by finalization.
    pub emitted_name: Option<String>,
    pub visibility: Visibility,
    pub provenance: Provenance,
    pub scope: EmitScope,
}

impl SymbolCore {
    pub fn new(id: MemberStableId, source_name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            id,
            source_name: source_name.into(),
            emitted_name: None,
            visibility,
            provenance: Provenance::Declared,
            scope: EmitScope::ClassSurface,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorSymbol {
    pub core: SymbolCore,
    pub parameters: Vec<Parameter>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSymbol {
    pub core: SymbolCore,
    #[serde(rename = "type")]
    pub ty: TypeReference,
    pub flags: MemberFlags,
    pub constant: Option<ConstantValue>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySymbol {
    pub core: SymbolCore,
    #[serde(rename = "type")]
    pub ty: TypeReference,
    /// Non-empty for indexers.
    pub index_parameters: Vec<Parameter>,
    pub flags: MemberFlags,
    pub has_getter: bool,
    pub has_setter: bool,
}

impl PropertySymbol {
    pub fn is_indexer(&self) -> bool {
        !self.index_parameters.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSymbol {
    pub core: SymbolCore,
    pub handler: TypeReference,
    pub flags: MemberFlags,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSymbol {
    pub core: SymbolCore,
    pub generic_parameters: Vec<GenericParameterDecl>,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeReference,
    pub flags: MemberFlags,
    /// For compatibility overloads: the member whose signature this widens.
    pub widens: Option<MemberStableId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Symbol {
    Constructor(ConstructorSymbol),
    Field(FieldSymbol),
    Property(PropertySymbol),
    Event(EventSymbol),
    Method(MethodSymbol),
}

impl Symbol {
    pub fn core(&self) -> &SymbolCore {
        match self {
            Self::Constructor(s) => &s.core,
            Self::Field(s) => &s.core,
            Self::Property(s) => &s.core,
            Self::Event(s) => &s.core,
            Self::Method(s) => &s.core,
        }
    }

    fn core_mut(&mut self) -> &mut SymbolCore {
        match self {
            Self::Constructor(s) => &mut s.core,
            Self::Field(s) => &mut s.core,
            Self::Property(s) => &mut s.core,
            Self::Event(s) => &mut s.core,
            Self::Method(s) => &mut s.core,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Self::Constructor(_) => SymbolKind::Constructor,
            Self::Field(_) => SymbolKind::Field,
            Self::Property(_) => SymbolKind::Property,
            Self::Event(_) => SymbolKind::Event,
            Self::Method(_) => SymbolKind::Method,
        }
    }

    pub fn id(&self) -> &MemberStableId {
        &self.core().id
    }

    pub fn source_name(&self) -> &str {
        &self.core().source_name
    }

    pub fn emitted_name(&self) -> Option<&str> {
        self.core().emitted_name.as_deref()
    }

    pub fn provenance(&self) -> Provenance {
        self.core().provenance
    }

    pub fn scope(&self) -> &EmitScope {
        &self.core().scope
    }

    pub fn flags(&self) -> MemberFlags {
        match self {
            Self::Constructor(_) => MemberFlags::empty(),
            Self::Field(s) => s.flags,
            Self::Property(s) => s.flags,
            Self::Event(s) => s.flags,
            Self::Method(s) => s.flags,
        }
    }

    pub fn is_static(&self) -> bool {
        self.flags().contains(MemberFlags::STATIC)
    }

    pub fn with_emitted_name(mut self, name: impl Into<String>) -> Self {
        self.core_mut().emitted_name = Some(name.into());
        self
    }

    pub fn with_scope(mut self, scope: EmitScope) -> Self {
        self.core_mut().scope = scope;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.core_mut().provenance = provenance;
        self
    }

    pub fn with_id(mut self, id: MemberStableId) -> Self {
        self.core_mut().id = id;
        self
    }

    /// Every type reference the member's shape mentions.
    pub fn referenced_types(&self) -> Vec<&TypeReference> {
        let mut refs = Vec::new();
        match self {
            Self::Constructor(s) => refs.extend(s.parameters.iter().map(|p| &p.ty)),
            Self::Field(s) => refs.push(&s.ty),
            Self::Property(s) => {
                refs.push(&s.ty);
                refs.extend(s.index_parameters.iter().map(|p| &p.ty));
            }
            Self::Event(s) => refs.push(&s.handler),
            Self::Method(s) => {
                refs.extend(s.parameters.iter().map(|p| &p.ty));
                refs.push(&s.return_type);
                for g in &s.generic_parameters {
                    refs.extend(g.constraints.iter());
                }
            }
        }
        refs
    }
}

#[cfg(test)]
#[path = "tests/symbols_tests.rs"]
mod tests;
