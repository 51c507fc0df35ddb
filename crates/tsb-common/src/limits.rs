//! Centralized limits and thresholds for the binding generator.
//!
//! The type graph handed to the engine comes from compiled metadata and is
//! usually shallow, but malformed or adversarial inputs (forwarding loops,
//! self-inheriting interfaces) must never overflow the stack. Every recursive
//! walk in the solver is bounded by one of these constants.

/// Maximum nesting depth when rendering a single type reference.
///
/// Deeper references are emitted as the universal fallback type together
/// with a finalization diagnostic.
pub const MAX_MAPPING_DEPTH: u32 = 64;

/// Maximum length of a type-forwarding chain followed while resolving the
/// owning module of a reference.
pub const MAX_FORWARDING_HOPS: u32 = 16;

/// Maximum depth for base-class and interface ancestor walks.
pub const MAX_ANCESTOR_DEPTH: u32 = 128;

/// Total work budget for one guarded walk.
pub const MAX_GUARD_ITERATIONS: u32 = 100_000;

/// Suffix limit when disambiguating a colliding name (`name2`, `name3`, …).
pub const MAX_NAME_SUFFIX: u32 = 1_000;
