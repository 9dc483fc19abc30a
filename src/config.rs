//! Manager configuration, read from an optional JSON file.

use crate::cuckoo_table::CuckooConfig;
use crate::error::CommandError;
use crate::hashing::DEFAULT_CAPACITY;
use crate::queue::DEFAULT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizes used when the manager creates a container on first use. Every
/// field is optional in the file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Slots in each new double-hashing table.
    pub table_capacity: usize,
    /// Slots in each new set.
    pub set_capacity: usize,
    pub cuckoo: CuckooConfig,
    /// Initial buffer size of arrays, stacks and queues.
    pub sequence_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            table_capacity: DEFAULT_CAPACITY,
            set_capacity: DEFAULT_CAPACITY,
            cuckoo: CuckooConfig::default(),
            sequence_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ManagerConfig {
    pub fn from_json_str(text: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CommandError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
