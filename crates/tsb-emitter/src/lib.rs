//! Emission layer for the tsb binding generator.
//!
//! - `printer` - `DeclarationPrinter`, declaration trees to declaration text
//! - `run_summary` - `RunSummary`, the JSON record of one run

pub mod printer;
pub mod run_summary;

pub use printer::{DeclarationPrinter, PRELUDE};
pub use run_summary::{RunSummary, TypeCounts};
