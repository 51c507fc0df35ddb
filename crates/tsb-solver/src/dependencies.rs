//! Foreign-module dependency tracking.
//!
//! Every foreign reference the mapper renders is reported here. The tracker
//! keeps one entry per module, in first-seen order, and owns the
//! module → alias mapping used for every occurrence of that module.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tsb_common::sanitize_identifier;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDependency {
    pub module: String,
    pub alias: String,
    /// Full names of the referenced types, in first-use order.
    pub types: Vec<String>,
}

/// Outcome of registering a module for the first time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Registration {
    Existing,
    New {
        alias: String,
        /// Set when the natural alias was taken: (natural alias, holder).
        displaced: Option<(String, String)>,
    },
}

#[derive(Debug, Default)]
pub struct DependencyTracker {
    entries: IndexMap<String, (String, IndexSet<String>)>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `System.Runtime` → `System_Runtime`, `my-lib` → `my_lib`.
    pub fn natural_alias(module: &str) -> String {
        let replaced: String = module
            .chars()
            .map(|c| if matches!(c, '.' | '-') { '_' } else { c })
            .collect();
        sanitize_identifier(&replaced, true).text
    }

    /// Alias `module` would get, without registering it.
    pub fn peek_alias(&self, module: &str) -> String {
        match self.entries.get(module) {
            Some((alias, _)) => alias.clone(),
            None => self.free_alias(module).0,
        }
    }

    pub fn alias_of(&self, module: &str) -> Option<&str> {
        self.entries.get(module).map(|(alias, _)| alias.as_str())
    }

    /// Record a reference to `full_name` owned by `module`.
    pub fn record(&mut self, module: &str, full_name: &str) -> Registration {
        if let Some((_, types)) = self.entries.get_mut(module) {
            types.insert(full_name.to_string());
            return Registration::Existing;
        }
        let (alias, displaced) = self.free_alias(module);
        let mut types = IndexSet::new();
        types.insert(full_name.to_string());
        self.entries
            .insert(module.to_string(), (alias.clone(), types));
        Registration::New { alias, displaced }
    }

    fn free_alias(&self, module: &str) -> (String, Option<(String, String)>) {
        let natural = Self::natural_alias(module);
        let holder = |candidate: &str| {
            self.entries
                .iter()
                .find(|(_, (alias, _))| alias == candidate)
                .map(|(m, _)| m.clone())
        };
        let Some(first_holder) = holder(&natural) else {
            return (natural, None);
        };
        let mut suffix = 2u32;
        loop {
            let candidate = format!("{natural}_{suffix}");
            if holder(&candidate).is_none() {
                return (candidate, Some((natural, first_holder)));
            }
            suffix += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ModuleDependency> {
        self.entries
            .into_iter()
            .map(|(module, (alias, types))| ModuleDependency {
                module,
                alias,
                types: types.into_iter().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_entry_per_module() {
        let mut tracker = DependencyTracker::new();
        assert!(matches!(tracker.record("Other", "Ns.A"), Registration::New { .. }));
        assert_eq!(tracker.record("Other", "Ns.B"), Registration::Existing);
        assert_eq!(tracker.record("Other", "Ns.A"), Registration::Existing);
        let entries = tracker.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].alias, "Other");
        assert_eq!(entries[0].types, vec!["Ns.A", "Ns.B"]);
    }

    #[test]
    fn colliding_aliases_are_suffixed_in_first_seen_order() {
        let mut tracker = DependencyTracker::new();
        tracker.record("my.lib", "A");
        let second = tracker.record("my-lib", "B");
        assert_eq!(
            second,
            Registration::New {
                alias: "my_lib_2".to_string(),
                displaced: Some(("my_lib".to_string(), "my.lib".to_string())),
            }
        );
        assert_eq!(tracker.alias_of("my.lib"), Some("my_lib"));
        assert_eq!(tracker.peek_alias("my_lib"), "my_lib_3");
        assert_eq!(tracker.peek_alias("my-lib"), "my_lib_2");
    }
}
