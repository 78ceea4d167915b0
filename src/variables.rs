//! Ordered variable store
//!
//! A `VariableStore` is the working copy of an environment's variables for a
//! single execution. It is built from an immutable [`Environment`] snapshot,
//! handed to the template resolver and the script sandbox, and returned in the
//! execution result. Nothing here is ever written back to the record store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::Environment;

/// Ordered key -> value mapping of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    vars: IndexMap<String, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an environment; later duplicate keys win
    pub fn from_environment(env: &Environment) -> Self {
        let mut store = Self::new();
        for var in &env.variables {
            store.set(&var.key, &var.value);
        }
        store
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rebuild the store from the entries a script finished with.
    ///
    /// Keys that existed before keep their position; keys the script added
    /// are appended in the order the script reported them.
    pub fn merged_with(&self, entries: Vec<(String, String)>) -> Self {
        let mut finished: IndexMap<String, String> = entries.into_iter().collect();
        let mut vars = IndexMap::with_capacity(finished.len());

        for key in self.vars.keys() {
            if let Some(value) = finished.shift_remove(key) {
                vars.insert(key.clone(), value);
            }
        }
        vars.extend(finished);

        Self { vars }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
