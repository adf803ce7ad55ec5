//! Error types for the pairing crate.

use std::fmt;
use switchboard_core::ParticipantId;
use switchboard_directory::DirectoryError;

/// Errors from the pairing persistence backend.
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
            Self::ReadFailed { reason } => write!(f, "pairing store read failed: {reason}"),
            Self::WriteFailed { reason } => write!(f, "pairing store write failed: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from session table operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// One of the pair already has a session.
    AlreadyInSession { id: ParticipantId },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInSession { id } => {
                write!(f, "participant {id} is already in a session")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors from match requests.
///
/// All variants are terminal for the single request; none leave queue
/// or session state partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The requester has no directory record.
    NotRegistered { id: ParticipantId },
    /// The requester is banned.
    Banned { id: ParticipantId },
    /// The requester already has a partner.
    AlreadyPaired { id: ParticipantId },
    /// The directory could not be consulted.
    Directory(DirectoryError),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRegistered { id } => write!(f, "participant {id} is not registered"),
            Self::Banned { id } => write!(f, "participant {id} is banned"),
            Self::AlreadyPaired { id } => {
                write!(f, "participant {id} is still connected, use next")
            }
            Self::Directory(e) => write!(f, "directory error: {e}"),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Directory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DirectoryError> for MatchError {
    fn from(e: DirectoryError) -> Self {
        Self::Directory(e)
    }
}
