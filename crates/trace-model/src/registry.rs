//! Marker name registry.
//!
//! Resolves the marker names declared in a trace header to column-group
//! offsets. Exports can repeat a display name (e.g. two markers both
//! labelled `WRIST`); repeats are disambiguated with `_1`, `_2`, ...
//! suffixes in order of appearance so every resolved name is unique.

use std::collections::HashMap;

/// Errors raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Marker not found: {name}")]
    NameNotFound { name: String },
}

/// Immutable mapping from resolved marker name to column-group offset.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    /// Resolved names in declaration order; index is the offset.
    names: Vec<String>,
    offsets: HashMap<String, usize>,
}

impl MarkerRegistry {
    /// Build a registry from header names in declaration order.
    pub fn from_names<I, S>(raw_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut offsets = HashMap::new();
        let mut suffix_counters: HashMap<String, usize> = HashMap::new();

        for raw in raw_names {
            let raw = raw.as_ref();
            let mut resolved = raw.to_string();

            if offsets.contains_key(&resolved) {
                let counter = suffix_counters.entry(raw.to_string()).or_insert(0);
                loop {
                    *counter += 1;
                    resolved = format!("{raw}_{counter}");
                    if !offsets.contains_key(&resolved) {
                        break;
                    }
                }
                tracing::debug!(marker = raw, resolved = %resolved, "renamed duplicate marker");
            }

            offsets.insert(resolved.clone(), names.len());
            names.push(resolved);
        }

        Self { names, offsets }
    }

    /// Column-group offset of a resolved marker name.
    pub fn offset(&self, name: &str) -> Result<usize, RegistryError> {
        self.offsets
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::NameNotFound {
                name: name.to_string(),
            })
    }

    /// Resolved names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
