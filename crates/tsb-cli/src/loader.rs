//! Module loader over a directory of JSON module descriptions.
//!
//! Every `<name>.json` file in the directory is one module:
//!
//! ```json
//! { "name": "Core", "types": [ ... ], "forwarded": [ ... ] }
//! ```
//!
//! All files are read when the loader is opened so that cross-module
//! lookups can hand out borrowed types. A file that fails to read or parse
//! only fails the module it describes.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tsb_model::{InMemoryLoader, LoadError, LoadedModule, ModuleLoader, SourceType};

pub struct JsonModuleLoader {
    root: PathBuf,
    modules: InMemoryLoader,
    failures: BTreeMap<String, LoadError>,
}

impl JsonModuleLoader {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let entries = std::fs::read_dir(&root)
            .with_context(|| format!("failed to read modules directory {}", root.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to list {}", root.display()))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loader = Self {
            root,
            modules: InMemoryLoader::new(),
            failures: BTreeMap::new(),
        };
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            match read_module(&path, &name) {
                Ok(module) => loader.modules.insert(module),
                Err(error) => {
                    warn!(module = %name, %error, "module file rejected");
                    loader.failures.insert(name, error);
                }
            }
        }
        debug!(
            root = %loader.root.display(),
            modules = loader.modules.module_names().count(),
            failures = loader.failures.len(),
            "modules directory indexed"
        );
        Ok(loader)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.module_names()
    }
}

fn read_module(path: &Path, name: &str) -> Result<LoadedModule, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        module: name.to_string(),
        message: e.to_string(),
    })?;
    let module: LoadedModule = serde_json::from_str(&text).map_err(|e| LoadError::Malformed {
        module: name.to_string(),
        message: e.to_string(),
    })?;
    if module.name != name {
        return Err(LoadError::Malformed {
            module: name.to_string(),
            message: format!("file declares module '{}'", module.name),
        });
    }
    Ok(module)
}

impl ModuleLoader for JsonModuleLoader {
    fn load_module(&self, name: &str) -> Result<LoadedModule, LoadError> {
        if let Some(error) = self.failures.get(name) {
            return Err(error.clone());
        }
        self.modules.load_module(name)
    }

    fn find_type(&self, module: &str, full_name: &str) -> Option<&SourceType> {
        self.modules.find_type(module, full_name)
    }

    fn forwarded_to(&self, module: &str, full_name: &str) -> Option<&str> {
        self.modules.forwarded_to(module, full_name)
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
