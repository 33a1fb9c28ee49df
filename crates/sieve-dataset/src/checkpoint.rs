use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

/// A scalar stored in an iterator checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Int64(i64),
    String(String),
}

/// The sink side of a checkpoint store.
///
/// Keys are full names produced by [`crate::name::full_name`],
/// so every iterator writes into its own namespace.
pub trait IteratorStateWriter {
    fn write_scalar(&mut self, key: &str, value: StateValue) -> DatasetResult<()>;

    fn write_i64(&mut self, key: &str, value: i64) -> DatasetResult<()> {
        self.write_scalar(key, StateValue::Int64(value))
    }

    fn write_str(&mut self, key: &str, value: &str) -> DatasetResult<()> {
        self.write_scalar(key, StateValue::String(value.to_string()))
    }
}

/// The source side of a checkpoint store.
///
/// Reading a key that is absent is an error. Callers must not substitute
/// a default for a missing entry.
pub trait IteratorStateReader {
    fn read_scalar(&self, key: &str) -> DatasetResult<&StateValue>;

    fn contains(&self, key: &str) -> bool;

    fn read_i64(&self, key: &str) -> DatasetResult<i64> {
        match self.read_scalar(key)? {
            StateValue::Int64(value) => Ok(*value),
            StateValue::String(_) => Err(DatasetError::checkpoint(format!(
                "expected an integer for checkpoint key: {key}"
            ))),
        }
    }

    fn read_str(&self, key: &str) -> DatasetResult<&str> {
        match self.read_scalar(key)? {
            StateValue::String(value) => Ok(value),
            StateValue::Int64(_) => Err(DatasetError::checkpoint(format!(
                "expected a string for checkpoint key: {key}"
            ))),
        }
    }
}

/// An in-memory checkpoint that can be persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryCheckpoint {
    entries: BTreeMap<String, StateValue>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        self.entries.remove(key)
    }

    pub fn to_json(&self) -> DatasetResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> DatasetResult<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

impl IteratorStateWriter for MemoryCheckpoint {
    fn write_scalar(&mut self, key: &str, value: StateValue) -> DatasetResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

impl IteratorStateReader for MemoryCheckpoint {
    fn read_scalar(&self, key: &str) -> DatasetResult<&StateValue> {
        self.entries
            .get(key)
            .ok_or_else(|| DatasetError::checkpoint(format!("missing checkpoint key: {key}")))
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_checkpoint_read_write() {
        let mut checkpoint = MemoryCheckpoint::new();
        checkpoint.write_i64("a:count", 3).unwrap();
        checkpoint.write_str("a:empty", "").unwrap();

        assert_eq!(checkpoint.len(), 2);
        assert_eq!(checkpoint.read_i64("a:count").unwrap(), 3);
        assert_eq!(checkpoint.read_str("a:empty").unwrap(), "");
        assert!(checkpoint.contains("a:empty"));
        assert!(!checkpoint.contains("b:count"));
    }

    #[test]
    fn test_memory_checkpoint_errors() {
        let mut checkpoint = MemoryCheckpoint::new();
        checkpoint.write_str("a:name", "x").unwrap();

        assert!(matches!(
            checkpoint.read_i64("a:missing"),
            Err(DatasetError::CheckpointError(_))
        ));
        assert!(matches!(
            checkpoint.read_i64("a:name"),
            Err(DatasetError::CheckpointError(_))
        ));
    }

    #[test]
    fn test_memory_checkpoint_json() {
        let mut checkpoint = MemoryCheckpoint::new();
        checkpoint.write_i64("it:next", -4).unwrap();
        checkpoint.write_str("it:input_impl_empty", "").unwrap();

        let json = checkpoint.to_json().unwrap();
        assert_eq!(json, r#"{"it:input_impl_empty":"","it:next":-4}"#);
        assert_eq!(MemoryCheckpoint::from_json(&json).unwrap(), checkpoint);
        assert!(MemoryCheckpoint::from_json("[1]").is_err());
    }
}
