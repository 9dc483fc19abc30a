//! Error types shared by the containers, the binary codec and the command
//! front end.

use thiserror::Error;

/// Outcome of a failed hash-table operation. Every variant is recoverable:
/// the table is left exactly as it was before the call.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TableError {
    /// No free slot is available for a new key.
    #[error("hash table is full (capacity {capacity})")]
    TableFull { capacity: usize },
    /// The key is not stored in the table.
    #[error("key not found")]
    KeyNotFound,
    /// A cuckoo eviction chain ran longer than its configured bound; the
    /// caller should rebuild into larger tables.
    #[error("eviction chain exceeded {limit} rounds, rehash required")]
    EvictionCycle { limit: usize },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ContainerError {
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("container is empty")]
    Empty,
}

/// Failure while reading or writing the little-endian binary layout.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("input ended while reading {what}")]
    Truncated { what: &'static str },
    #[error("stored string is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("value {0} does not fit in the 32-bit binary layout")]
    OutOfRange(i64),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Failure of one front-end command. The manager stays usable afterwards.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type HELP for the list")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("`{0}` is not a valid integer")]
    InvalidNumber(String),
    #[error("unknown container kind `{0}`")]
    UnknownKind(String),
    #[error("{kind} `{name}` does not exist")]
    UnknownContainer { kind: &'static str, name: String },
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_error_display() {
        assert_eq!(
            TableError::TableFull { capacity: 5 }.to_string(),
            "hash table is full (capacity 5)"
        );
        assert_eq!(TableError::KeyNotFound.to_string(), "key not found");
    }

    #[test]
    fn command_error_wraps_table_error() {
        let e: CommandError = TableError::EvictionCycle { limit: 3 }.into();
        assert_eq!(e.to_string(), "eviction chain exceeded 3 rounds, rehash required");
    }
}
