//! Common types and utilities for the tsb binding generator.
//!
//! This crate provides foundational pieces shared across all tsb crates:
//! - The diagnostics registry (`diagnostic_codes`, message templates, groups)
//! - Severity policy (`DiagnosticPolicy`, `Severity`)
//! - Naming transforms and identifier sanitation (`NameTransform`)
//! - Centralized limits and thresholds

// Diagnostic codes, groups and message templates
pub mod data;
pub use data::{DIAGNOSTIC_MESSAGES, DiagnosticGroup, diagnostic_codes};

// Severity and policy
pub mod diagnostics;
pub use diagnostics::{
    DiagnosticMessage, DiagnosticPolicy, Severity, format_code, format_message,
    get_message_template, parse_code,
};

// Centralized limits and thresholds
pub mod limits;

// Naming transforms (identity / camelCase) and identifier sanitation
pub mod naming;
pub use naming::{NameTransform, Sanitized, is_reserved_word, sanitize_identifier};
