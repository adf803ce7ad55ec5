//! Error types for the directory crate.

use std::fmt;
use switchboard_core::ParticipantId;

/// Errors from the directory persistence backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A read from the backing store failed.
    ReadFailed { reason: String },
    /// A write to the backing store failed.
    WriteFailed { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { reason } => write!(f, "directory store read failed: {reason}"),
            Self::WriteFailed { reason } => write!(f, "directory store write failed: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from directory operations.
///
/// The first four are state-machine validation errors: terminal for the
/// requested operation, surfaced verbatim to the participant, and never
/// leaving the directory partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The id is in the banned set and may not register.
    AlreadyBanned { id: ParticipantId },
    /// The id has no Registered record.
    NotRegistered { id: ParticipantId },
    /// The id is unknown to the directory entirely.
    NotFound { id: ParticipantId },
    /// The id is not in the banned set.
    NotBanned { id: ParticipantId },
    /// The persistence backend failed.
    Storage(StoreError),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyBanned { id } => write!(f, "participant {id} is banned"),
            Self::NotRegistered { id } => write!(f, "participant {id} is not registered"),
            Self::NotFound { id } => write!(f, "participant {id} not found"),
            Self::NotBanned { id } => write!(f, "participant {id} is not banned"),
            Self::Storage(e) => write!(f, "directory storage error: {e}"),
        }
    }
}

impl std::error::Error for DirectoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for DirectoryError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e)
    }
}
