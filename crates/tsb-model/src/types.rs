//! Type Reference Model
//!
//! `TypeReference` is the canonical, structurally compared representation
//! of every type the source object model can mention. It is a closed sum
//! type: every consumer matches exhaustively, so a new variant is a compile
//! error everywhere it needs handling.
//!
//! References are immutable values. Two references are equal iff they are
//! the same variant with the same field values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker separating a generic type's simple name from its arity (`List`1`).
pub const ARITY_MARKER: char = '`';

/// Separator between a nested type and its declaring type in full names.
pub const NESTED_SEPARATOR: char = '+';

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeReference {
    /// A named class, struct, interface, enum or delegate.
    Named(NamedType),
    /// A type parameter of a type or a method.
    GenericParameter(GenericParameterRef),
    /// `T[]` (rank 1) or a multidimensional array.
    Array {
        element: Box<TypeReference>,
        rank: u32,
    },
    /// `T*`, `T**`, …
    Pointer {
        pointee: Box<TypeReference>,
        depth: u32,
    },
    /// `ref T` / `out T` parameter.
    ByRef { referenced: Box<TypeReference> },
    /// A type nested inside another type.
    Nested(NestedType),
    /// Stand-in produced when a reference cannot be expanded without
    /// re-entering itself. Rendering one always produces a diagnostic.
    Placeholder {
        #[serde(rename = "debugName")]
        debug_name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "NamedTypeRepr")]
pub struct NamedType {
    /// Identity of the module that declares (or forwards) the type.
    pub module: String,
    /// Namespace-qualified name, arity marker included (`Ns.Box`1`).
    pub full_name: String,
    pub namespace: String,
    /// Simple name as declared, arity marker included.
    pub name: String,
    pub arity: u32,
    pub type_arguments: Vec<TypeReference>,
    pub is_value_type: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
}

/// Wire form of [`NamedType`]; loaders may omit everything derivable from
/// the full name.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamedTypeRepr {
    module: String,
    full_name: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arity: Option<u32>,
    #[serde(default)]
    type_arguments: Vec<TypeReference>,
    #[serde(default)]
    is_value_type: bool,
    #[serde(default)]
    stable_id: Option<String>,
}

impl From<NamedTypeRepr> for NamedType {
    fn from(repr: NamedTypeRepr) -> Self {
        let derived = NamedType::new(repr.module, repr.full_name);
        let name = repr.name.unwrap_or(derived.name);
        Self {
            arity: repr.arity.unwrap_or_else(|| arity_of(&name)),
            namespace: repr.namespace.unwrap_or(derived.namespace),
            name,
            module: derived.module,
            full_name: derived.full_name,
            type_arguments: repr.type_arguments,
            is_value_type: repr.is_value_type,
            stable_id: repr.stable_id,
        }
    }
}

impl NamedType {
    /// Build a reference from a full name, deriving namespace, simple name
    /// and arity.
    pub fn new(module: impl Into<String>, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let (namespace, name) = split_full_name(&full_name);
        let arity = arity_of(&name);
        Self {
            module: module.into(),
            namespace,
            name,
            arity,
            full_name,
            type_arguments: Vec::new(),
            is_value_type: false,
            stable_id: None,
        }
    }

    pub fn with_arguments(mut self, args: Vec<TypeReference>) -> Self {
        self.type_arguments = args;
        self
    }

    pub fn value_type(mut self) -> Self {
        self.is_value_type = true;
        self
    }

    /// An arity > 0 reference that supplies no arguments.
    pub fn is_open(&self) -> bool {
        self.arity > 0 && self.type_arguments.is_empty()
    }

    /// Simple name with the arity marker stripped.
    pub fn base_name(&self) -> &str {
        strip_arity(&self.name)
    }

    /// Arity contributed by this type itself, excluding any inherited from
    /// a declaring type (`Outer`1+Inner` declares none of its own).
    pub fn own_arity(&self) -> u32 {
        arity_of(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericParameterRef {
    /// Declaring context: a type full name, or `Type::Method` for method
    /// type parameters.
    pub owner: String,
    pub name: String,
    pub position: u32,
    #[serde(default)]
    pub constraints: Vec<TypeReference>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedType {
    pub declaring: Box<TypeReference>,
    pub name: String,
    /// The nested type itself as a flat `Named` reference, arguments included.
    pub full: Box<TypeReference>,
}

impl TypeReference {
    pub fn named(module: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::Named(NamedType::new(module, full_name))
    }

    pub fn generic(
        module: impl Into<String>,
        full_name: impl Into<String>,
        args: Vec<TypeReference>,
    ) -> Self {
        Self::Named(NamedType::new(module, full_name).with_arguments(args))
    }

    pub fn generic_parameter(owner: impl Into<String>, name: impl Into<String>, position: u32) -> Self {
        Self::GenericParameter(GenericParameterRef {
            owner: owner.into(),
            name: name.into(),
            position,
            constraints: Vec::new(),
        })
    }

    pub fn array(element: TypeReference, rank: u32) -> Self {
        Self::Array {
            element: Box::new(element),
            rank: rank.max(1),
        }
    }

    pub fn pointer(pointee: TypeReference, depth: u32) -> Self {
        Self::Pointer {
            pointee: Box::new(pointee),
            depth: depth.max(1),
        }
    }

    pub fn by_ref(referenced: TypeReference) -> Self {
        Self::ByRef {
            referenced: Box::new(referenced),
        }
    }

    pub fn nested(declaring: TypeReference, full: NamedType) -> Self {
        let name = full
            .full_name
            .rsplit(NESTED_SEPARATOR)
            .next()
            .unwrap_or(&full.name)
            .to_string();
        Self::Nested(NestedType {
            declaring: Box::new(declaring),
            name,
            full: Box::new(Self::Named(full)),
        })
    }

    pub fn placeholder(debug_name: impl Into<String>) -> Self {
        Self::Placeholder {
            debug_name: debug_name.into(),
        }
    }

    /// Flat `Named` view of this reference (nested types resolve to their
    /// full reference).
    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            Self::Named(named) => Some(named),
            Self::Nested(nested) => nested.full.as_named(),
            Self::GenericParameter(_)
            | Self::Array { .. }
            | Self::Pointer { .. }
            | Self::ByRef { .. }
            | Self::Placeholder { .. } => None,
        }
    }

    pub fn full_name(&self) -> Option<&str> {
        self.as_named().map(|n| n.full_name.as_str())
    }

    pub fn module(&self) -> Option<&str> {
        self.as_named().map(|n| n.module.as_str())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    /// Key used by in-progress markers: the precomputed stable id when the
    /// loader supplied one, otherwise the module-qualified canonical form.
    pub fn stable_key(&self) -> String {
        match self {
            Self::Named(named) => named
                .stable_id
                .clone()
                .unwrap_or_else(|| format!("{}:{}", named.module, self)),
            Self::Nested(nested) => nested.full.stable_key(),
            Self::GenericParameter(p) => format!("{}!{}", p.owner, p.name),
            Self::Array { .. }
            | Self::Pointer { .. }
            | Self::ByRef { .. }
            | Self::Placeholder { .. } => self.to_string(),
        }
    }

    /// Visit this reference and every reference nested inside it.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a TypeReference)) {
        f(self);
        match self {
            Self::Named(named) => {
                for arg in &named.type_arguments {
                    arg.walk(f);
                }
            }
            Self::GenericParameter(_) | Self::Placeholder { .. } => {}
            Self::Array { element, .. } => element.walk(f),
            Self::Pointer { pointee, .. } => pointee.walk(f),
            Self::ByRef { referenced } => referenced.walk(f),
            Self::Nested(nested) => {
                nested.declaring.walk(f);
                nested.full.walk(f);
            }
        }
    }

    pub fn any(&self, mut pred: impl FnMut(&TypeReference) -> bool) -> bool {
        let mut found = false;
        self.walk(&mut |r| found |= pred(r));
        found
    }

    pub fn mentions_generic_parameter_of(&self, owner: &str) -> bool {
        self.any(|r| matches!(r, Self::GenericParameter(p) if p.owner == owner))
    }

    /// Rebuild the reference, replacing generic parameters through `subst`.
    pub fn substitute(&self, subst: &Substitution) -> TypeReference {
        match self {
            Self::GenericParameter(p) => subst
                .lookup(p)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Self::Named(named) => {
                if named.type_arguments.is_empty() {
                    return self.clone();
                }
                let mut named = named.clone();
                named.type_arguments = named
                    .type_arguments
                    .iter()
                    .map(|a| a.substitute(subst))
                    .collect();
                Self::Named(named)
            }
            Self::Array { element, rank } => Self::Array {
                element: Box::new(element.substitute(subst)),
                rank: *rank,
            },
            Self::Pointer { pointee, depth } => Self::Pointer {
                pointee: Box::new(pointee.substitute(subst)),
                depth: *depth,
            },
            Self::ByRef { referenced } => Self::ByRef {
                referenced: Box::new(referenced.substitute(subst)),
            },
            Self::Nested(nested) => Self::Nested(NestedType {
                declaring: Box::new(nested.declaring.substitute(subst)),
                name: nested.name.clone(),
                full: Box::new(nested.full.substitute(subst)),
            }),
            Self::Placeholder { .. } => self.clone(),
        }
    }
}

/// Canonical, mapping-independent rendering used in stable ids:
/// ``Ns.List`1[System.Int32]``, `T`, `System.Byte[,]`, `System.Int32*`,
/// `System.Int32&`.
impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => {
                f.write_str(&named.full_name)?;
                if !named.type_arguments.is_empty() {
                    f.write_str("[")?;
                    for (i, arg) in named.type_arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
            Self::GenericParameter(p) => f.write_str(&p.name),
            Self::Array { element, rank } => {
                write!(f, "{element}[")?;
                for _ in 1..*rank {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
            Self::Pointer { pointee, depth } => {
                write!(f, "{pointee}")?;
                for _ in 0..*depth {
                    f.write_str("*")?;
                }
                Ok(())
            }
            Self::ByRef { referenced } => write!(f, "{referenced}&"),
            Self::Nested(nested) => write!(f, "{}", nested.full),
            Self::Placeholder { debug_name } => write!(f, "?{debug_name}"),
        }
    }
}

/// Replacement of one owner's generic parameters by position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    pub owner: String,
    pub arguments: Vec<TypeReference>,
}

impl Substitution {
    pub fn new(owner: impl Into<String>, arguments: Vec<TypeReference>) -> Self {
        Self {
            owner: owner.into(),
            arguments,
        }
    }

    /// Substitution implied by a heritage reference such as `IList<int>`.
    pub fn for_reference(reference: &TypeReference) -> Option<Self> {
        let named = reference.as_named()?;
        if named.type_arguments.is_empty() {
            return None;
        }
        Some(Self::new(
            named.full_name.clone(),
            named.type_arguments.clone(),
        ))
    }

    fn lookup(&self, p: &GenericParameterRef) -> Option<&TypeReference> {
        if p.owner != self.owner {
            return None;
        }
        self.arguments.get(p.position as usize)
    }
}

pub fn strip_arity(name: &str) -> &str {
    match name.find(ARITY_MARKER) {
        Some(idx) => &name[..idx],
        None => name,
    }
}

pub fn arity_of(name: &str) -> u32 {
    name.rsplit_once(ARITY_MARKER)
        .and_then(|(_, digits)| digits.parse().ok())
        .unwrap_or(0)
}

/// `Ns.Sub.Outer+Inner` → (`Ns.Sub`, `Inner`). The namespace is taken from
/// the outermost type so nested names never leak into it.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let outermost = full_name.split(NESTED_SEPARATOR).next().unwrap_or(full_name);
    let namespace = match outermost.rfind('.') {
        Some(idx) => outermost[..idx].to_string(),
        None => String::new(),
    };
    let simple = match full_name.rfind(NESTED_SEPARATOR) {
        Some(idx) => &full_name[idx + 1..],
        None => match full_name.rfind('.') {
            Some(idx) => &full_name[idx + 1..],
            None => full_name,
        },
    };
    (namespace, simple.to_string())
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
