//! Ordered parameter bag
//!
//! Insertion order is the render order. Re-adding a key replaces its value
//! in place, keeping the position of the first insertion.

use std::sync::Arc;

use oplog_core_types::Key;

use crate::errors::{require_non_blank, Result};
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a parameter
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the key is empty or whitespace-only.
    pub fn put(&mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Result<()> {
        let key = key.as_ref();
        require_non_blank("key", key)?;
        self.insert(key, value.into());
        Ok(())
    }

    /// Add every entry of `entries`, in iteration order
    ///
    /// All keys are checked before any entry is added, so a rejected batch
    /// leaves the bag untouched.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any key is empty or whitespace-only.
    pub fn put_all<I, K, V>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let entries: Vec<(K, Value)> = entries.into_iter().map(|(k, v)| (k, v.into())).collect();
        for (key, _) in &entries {
            require_non_blank("key", key.as_ref())?;
        }
        for (key, value) in entries {
            self.insert(key.as_ref(), value);
        }
        Ok(())
    }

    /// Well-known keys are never blank, so this cannot fail
    pub(crate) fn put_key(&mut self, key: Key, value: impl Into<Value>) {
        self.insert(key.as_str(), value.into());
    }

    fn insert(&mut self, key: &str, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Immutable ordered copy, safe to hand to another thread
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot(Arc::from(self.entries.clone()))
    }
}

/// Frozen view of a `Parameters` bag
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot(Arc<[(String, Value)]>);

impl ParameterSnapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
