//! The fixed diagnostic taxonomy.
//!
//! Codes are grouped by thousands-block; the block determines the
//! [`DiagnosticGroup`]. Severity is not part of this table;
//! it is assigned by [`crate::DiagnosticPolicy`].

use crate::diagnostics::DiagnosticMessage;
use serde::{Deserialize, Serialize};

/// Concern a diagnostic code belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticGroup {
    Resolution,
    Naming,
    Hierarchy,
    TargetCompatibility,
    Policy,
    Views,
    Metadata,
    Finalization,
    Emission,
    SurfaceNaming,
    GenericLifting,
    ModuleLoad,
}

impl DiagnosticGroup {
    /// Group for a code, derived from its thousands-block.
    pub const fn of(code: u32) -> Option<Self> {
        Some(match code / 1000 {
            1 => Self::Resolution,
            2 => Self::Naming,
            3 => Self::Hierarchy,
            4 => Self::TargetCompatibility,
            5 => Self::Policy,
            6 => Self::Views,
            7 => Self::Metadata,
            8 => Self::Finalization,
            9 => Self::Emission,
            10 => Self::SurfaceNaming,
            11 => Self::GenericLifting,
            12 => Self::ModuleLoad,
            _ => return None,
        })
    }
}

pub mod diagnostic_codes {
    // Resolution / binding
    pub const TYPE_CONVERSION_FAILED: u32 = 1001;
    pub const UNRESOLVED_INTERFACE: u32 = 1002;
    pub const UNRESOLVED_BASE_TYPE: u32 = 1003;
    pub const INHERITANCE_CYCLE: u32 = 1004;

    // Naming / conflicts
    pub const MEMBER_NAME_CONFLICT: u32 = 2001;
    pub const DECLARATION_NAME_COLLISION: u32 = 2002;

    // Overload / hierarchy
    pub const OVERLOAD_SYNTHESIZED: u32 = 3001;
    pub const COVARIANT_OVERLOAD_UNREPRESENTABLE: u32 = 3002;
    pub const PROPERTY_COVARIANCE_ACCEPTED: u32 = 3003;
    pub const DIAMOND_RESOLVED: u32 = 3004;
    pub const INTERFACE_MEMBER_CONFLICT: u32 = 3005;
    pub const REDUNDANT_PROPERTY_ELIDED: u32 = 3006;

    // Target compatibility
    pub const MULTIDIMENSIONAL_ARRAY: u32 = 4001;
    pub const INDEXER_UNREPRESENTABLE: u32 = 4002;
    pub const NUMERIC_FALLBACK: u32 = 4003;

    // Policy / constraints
    pub const NAMESPACE_EXCLUDED: u32 = 5001;
    pub const MEMBER_EXCLUDED: u32 = 5002;
    pub const INVALID_RENAME: u32 = 5003;

    // Renaming / views
    pub const MEMBER_DEMOTED_TO_VIEW: u32 = 6001;
    pub const MEMBER_RENAMED: u32 = 6002;

    // Metadata / binding
    pub const GENERIC_ARITY_MISMATCH: u32 = 7001;
    pub const EXPLICIT_IMPL_UNKNOWN_INTERFACE: u32 = 7002;

    // Finalization / scope integrity
    pub const UNNAMED_SYMBOL_DROPPED: u32 = 8001;
    pub const PLACEHOLDER_EMITTED: u32 = 8002;
    pub const LATE_DECLARATION_REJECTED: u32 = 8003;

    // Emission / import / module
    pub const DEPENDENCY_REGISTERED: u32 = 9001;
    pub const MODULE_ALIAS_DISAMBIGUATED: u32 = 9002;
    pub const FORWARDING_CYCLE: u32 = 9003;

    // Surface-naming policy
    pub const IDENTIFIER_SANITIZED: u32 = 10001;

    // Generic lifting
    pub const STATIC_MEMBER_LIFTED: u32 = 11001;
    pub const CONSTRAINT_DROPPED: u32 = 11002;

    // Module load
    pub const FORWARDED_TYPE_LOAD_FAILED: u32 = 12001;
    pub const DUPLICATE_TYPE: u32 = 12002;
}

use diagnostic_codes as dc;

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage::new(
        dc::TYPE_CONVERSION_FAILED,
        "Failed to convert type '{0}' in module '{1}': {2}",
    ),
    DiagnosticMessage::new(
        dc::UNRESOLVED_INTERFACE,
        "Interface '{0}' implemented by '{1}' could not be resolved; it is treated as a leaf.",
    ),
    DiagnosticMessage::new(
        dc::UNRESOLVED_BASE_TYPE,
        "Base type '{0}' of '{1}' could not be resolved; its members are unavailable.",
    ),
    DiagnosticMessage::new(
        dc::INHERITANCE_CYCLE,
        "Inheritance cycle detected while walking the ancestors of '{0}' at '{1}'.",
    ),
    DiagnosticMessage::new(
        dc::MEMBER_NAME_CONFLICT,
        "{0} conflicts with {1} on the surface of '{2}'.",
    ),
    DiagnosticMessage::new(
        dc::DECLARATION_NAME_COLLISION,
        "Name '{0}' is already declared in namespace '{1}'; '{2}' is emitted as '{3}'.",
    ),
    DiagnosticMessage::new(
        dc::OVERLOAD_SYNTHESIZED,
        "Synthesized compatibility overload {0} for {1}.",
    ),
    DiagnosticMessage::new(
        dc::COVARIANT_OVERLOAD_UNREPRESENTABLE,
        "Cannot synthesize a compatibility overload of {0} for {1}: it would reference type parameter '{2}' of '{3}'.",
    ),
    DiagnosticMessage::new(
        dc::PROPERTY_COVARIANCE_ACCEPTED,
        "Property {0} narrows {1}; the narrower type is kept.",
    ),
    DiagnosticMessage::new(
        dc::DIAMOND_RESOLVED,
        "Interfaces of '{0}' converge on '{1}'; heritage emitted through alias '{2}'.",
    ),
    DiagnosticMessage::new(
        dc::INTERFACE_MEMBER_CONFLICT,
        "Interface '{0}' inherits incompatible members named '{1}' from '{2}' and '{3}'.",
    ),
    DiagnosticMessage::new(
        dc::REDUNDANT_PROPERTY_ELIDED,
        "Property {0} redeclares {1} with an identical type and was elided.",
    ),
    DiagnosticMessage::new(
        dc::MULTIDIMENSIONAL_ARRAY,
        "Array of rank {0} of '{1}' is emitted as nested arrays.",
    ),
    DiagnosticMessage::new(
        dc::INDEXER_UNREPRESENTABLE,
        "Indexer {0} cannot be expressed as an index signature and was dropped.",
    ),
    DiagnosticMessage::new(
        dc::NUMERIC_FALLBACK,
        "Type '{0}' has no fixed alias and is emitted as '{1}'.",
    ),
    DiagnosticMessage::new(
        dc::NAMESPACE_EXCLUDED,
        "Namespace '{0}' is excluded by configuration.",
    ),
    DiagnosticMessage::new(
        dc::MEMBER_EXCLUDED,
        "Member '{0}' is excluded by configuration.",
    ),
    DiagnosticMessage::new(
        dc::INVALID_RENAME,
        "Rename of '{0}' to '{1}' is not a valid identifier; '{2}' is used instead.",
    ),
    DiagnosticMessage::new(
        dc::MEMBER_DEMOTED_TO_VIEW,
        "{0} was moved from the surface of '{1}' to view '{2}'.",
    ),
    DiagnosticMessage::new(
        dc::MEMBER_RENAMED,
        "{0} is emitted as '{1}' to avoid a collision on '{2}'.",
    ),
    DiagnosticMessage::new(
        dc::GENERIC_ARITY_MISMATCH,
        "Reference to '{0}' supplies {1} type arguments but the type declares {2}.",
    ),
    DiagnosticMessage::new(
        dc::EXPLICIT_IMPL_UNKNOWN_INTERFACE,
        "Explicit implementation {0} names interface '{1}' which '{2}' does not implement.",
    ),
    DiagnosticMessage::new(
        dc::UNNAMED_SYMBOL_DROPPED,
        "{0} reached finalization without an emitted name and was dropped.",
    ),
    DiagnosticMessage::new(
        dc::PLACEHOLDER_EMITTED,
        "Recursive reference '{0}' was emitted as '{1}'.",
    ),
    DiagnosticMessage::new(
        dc::LATE_DECLARATION_REJECTED,
        "Declaration '{0}' was added to namespace '{1}' after its ordinary declarations were sealed and was rejected.",
    ),
    DiagnosticMessage::new(
        dc::DEPENDENCY_REGISTERED,
        "Module '{0}' is imported as '{1}'.",
    ),
    DiagnosticMessage::new(
        dc::MODULE_ALIAS_DISAMBIGUATED,
        "Alias '{0}' for module '{1}' is already used by module '{2}'; using '{3}'.",
    ),
    DiagnosticMessage::new(
        dc::FORWARDING_CYCLE,
        "Type forwarding of '{0}' loops back through module '{1}'.",
    ),
    DiagnosticMessage::new(
        dc::IDENTIFIER_SANITIZED,
        "Name '{0}' is not a valid identifier and is emitted as '{1}'.",
    ),
    DiagnosticMessage::new(
        dc::STATIC_MEMBER_LIFTED,
        "Static member {0} references type parameters of '{1}' and was moved to its companion namespace.",
    ),
    DiagnosticMessage::new(
        dc::CONSTRAINT_DROPPED,
        "Constraint '{0}' on type parameter '{1}' is not expressible and was dropped.",
    ),
    DiagnosticMessage::new(
        dc::FORWARDED_TYPE_LOAD_FAILED,
        "Forwarded type '{0}' of module '{1}' could not be loaded: {2}",
    ),
    DiagnosticMessage::new(
        dc::DUPLICATE_TYPE,
        "Type '{0}' appears more than once in module '{1}'; the first definition is kept.",
    ),
];
