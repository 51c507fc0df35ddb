//! Data model for the tsb binding generator.
//!
//! - `types` - `TypeReference`, the closed set of referenceable type shapes
//! - `stable_id` - `MemberStableId`, the run-stable member key
//! - `symbols` - immutable per-member records (`Symbol` and its variants)
//! - `declarations` - namespace-scoped declaration trees
//! - `source` - the loader-facing input model and the `ModuleLoader` trait

pub mod declarations;
pub mod source;
pub mod stable_id;
pub mod symbols;
pub mod types;

pub use declarations::{
    ClassDecl, Declaration, DeclarationKind, EnumDecl, EnumMember, InterfaceDecl,
    IntersectionAlias, MemberDecl, NamespaceDecl, NamespaceError, ParameterDecl,
    StaticNamespaceDecl, TypeText, ViewAccessor,
};
pub use source::{
    ForwardOutcome, ForwardedType, InMemoryLoader, LoadError, LoadedModule, ModuleLoader,
    SourceKind, SourceMember, SourceType,
};
pub use stable_id::MemberStableId;
pub use symbols::{
    ConstantValue, ConstructorSymbol, EmitScope, EventSymbol, FieldSymbol, GenericParameterDecl,
    MemberFlags, MethodSymbol, Parameter, PropertySymbol, Provenance, ScopeKey,
    SpecialConstraints, Symbol, SymbolCore, SymbolKind, Visibility,
};
pub use types::{GenericParameterRef, NamedType, NestedType, Substitution, TypeReference};
