//! In-memory key/value sink
//!
//! A local stand-in for the distributed store, used by tests and by dry
//! runs that want to preview the tree without a live cluster.

use std::collections::BTreeMap;

use super::{KvSink, SinkError};

/// An ordered in-memory sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored leaves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a single leaf.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// All `(path, value)` entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl KvSink for MemorySink {
    fn put(&mut self, path: &str, value: &str) -> Result<(), SinkError> {
        self.entries.insert(path.to_string(), value.to_string());
        Ok(())
    }

    fn delete_prefix(&mut self, prefix: &str) -> Result<(), SinkError> {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
