//! Fixed primitive table.
//!
//! The aliases on the right are declared by the emitter prelude. Lookups are
//! pure: the same full name always maps to the same alias.

/// Source full name → target alias.
pub const PRIMITIVES: &[(&str, &str)] = &[
    ("System.Boolean", "boolean"),
    ("System.Byte", "byte"),
    ("System.Char", "char"),
    ("System.Decimal", "decimal"),
    ("System.Double", "double"),
    ("System.Int16", "short"),
    ("System.Int32", "int"),
    ("System.Int64", "long"),
    ("System.Object", "unknown"),
    ("System.SByte", "sbyte"),
    ("System.Single", "float"),
    ("System.String", "string"),
    ("System.UInt16", "ushort"),
    ("System.UInt32", "uint"),
    ("System.UInt64", "ulong"),
    ("System.Void", "void"),
];

/// Numeric-like system types outside the table.
const NUMERIC_FALLBACKS: &[&str] = &[
    "System.Half",
    "System.Int128",
    "System.IntPtr",
    "System.UInt128",
    "System.UIntPtr",
];

/// Where a reference is being rendered; decides the fallback for numeric
/// types without a fixed alias.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapSite {
    Value,
    /// Enum underlying types, constants, pointer and array elements.
    Numeric,
}

impl MapSite {
    pub const fn numeric_fallback(self) -> &'static str {
        match self {
            Self::Value => "any",
            Self::Numeric => "number",
        }
    }
}

pub fn primitive_alias(full_name: &str) -> Option<&'static str> {
    PRIMITIVES
        .binary_search_by(|(name, _)| name.cmp(&full_name))
        .ok()
        .map(|idx| PRIMITIVES[idx].1)
}

pub fn is_numeric_fallback(full_name: &str) -> bool {
    NUMERIC_FALLBACKS.binary_search(&full_name).is_ok()
}

/// Whether `alias` is one of the integral or floating aliases.
pub fn is_numeric_alias(alias: &str) -> bool {
    matches!(
        alias,
        "byte" | "sbyte" | "short" | "ushort" | "int" | "uint" | "long" | "ulong" | "float"
            | "double" | "decimal" | "number"
    )
}

/// The async-task family, mapped to `Future<…>`.
pub fn is_task(full_name: &str) -> bool {
    matches!(
        full_name,
        "System.Threading.Tasks.Task"
            | "System.Threading.Tasks.ValueTask"
            | "System.Threading.Tasks.Task`1"
            | "System.Threading.Tasks.ValueTask`1"
    )
}

pub const NULLABLE: &str = "System.Nullable`1";

/// Base types that never appear in a heritage clause.
pub fn is_implicit_base(full_name: &str) -> bool {
    matches!(
        full_name,
        "System.Object" | "System.ValueType" | "System.Enum" | "System.MulticastDelegate"
            | "System.Delegate"
    )
}

/// Constraint types with no structural counterpart.
pub fn is_inexpressible_constraint(full_name: &str) -> bool {
    matches!(full_name, "System.ValueType" | "System.Enum")
}
