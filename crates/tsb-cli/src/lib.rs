//! Command-line front end for the tsb binding generator.
//!
//! - `args` - clap definition of the `tsb` command line
//! - `config` - `tsb.json` into `EngineOptions`
//! - `loader` - `JsonModuleLoader` over a directory of module files
//! - `driver` - one run: generate, print, summarize, gate
//! - `reporter` - diagnostic and summary lines for stderr
//! - `tracing_config` - subscriber setup from `TSB_LOG` / `TSB_LOG_FORMAT`

pub mod args;
pub mod config;
pub mod driver;
pub mod loader;
pub mod reporter;
pub mod tracing_config;

// Module-file builders for the unit tests loaded via #[path = "tests/..."].
#[cfg(test)]
#[path = "tests/fixture.rs"]
mod fixture;
