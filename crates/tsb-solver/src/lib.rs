//! Type-System Translation Engine
//!
//! Converts one nominal module at a time into namespaced declaration trees
//! for a structural target. Per module:
//!
//! - **Catalog**: emitted types, forwarding, ancestry with heritage
//!   arguments substituted
//! - **Mapper**: type references to target text, cross-module aliasing,
//!   recursion breaking
//! - **Reconciler**: compatibility overloads for covariant returns
//! - **Naming & views**: surface names, conflict demotion into views,
//!   redundant property elision
//! - **Diamonds**: converging interface heritage folded into aliases
//!
//! All mutable state of a run lives in a [`pass::ModulePass`] created per
//! module.
pub mod catalog;
mod convert;
pub mod dependencies;
pub mod diagnostics;
mod diamond;
mod engine;
mod error;
pub mod mapper;
mod members;
mod naming;
pub mod options;
mod overloads;
pub mod pass;
pub mod primitives;
pub mod recursion;

pub use dependencies::{DependencyTracker, ModuleDependency};
pub use diagnostics::{Diagnostic, DiagnosticContext, DiagnosticSink, cite_member};
pub use engine::{BindingEngine, ModuleOutput};
pub use error::{ConvertError, EngineError};
pub use options::{EngineOptions, NamingPolicy};

// Shared builders for the unit tests loaded by each module via #[path = "tests/..."].
#[cfg(test)]
#[path = "tests/fixture.rs"]
mod fixture;
