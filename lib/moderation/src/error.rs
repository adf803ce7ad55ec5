//! Error types for the moderation crate.

use std::fmt;
use switchboard_core::ParticipantId;
use switchboard_directory::DirectoryError;

/// Errors from moderation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationError {
    /// The actor is not in the administrator allowlist.
    Unauthorized { actor: ParticipantId },
    /// The target has no directory record to ban.
    NotFound { id: ParticipantId },
    /// The target is not in the banned set.
    NotBanned { id: ParticipantId },
    /// The directory could not apply the transition.
    Directory(DirectoryError),
    /// The report log rejected an append.
    ReportFailed { reason: String },
}

impl fmt::Display for ModerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized { actor } => {
                write!(f, "participant {actor} is not authorized to moderate")
            }
            Self::NotFound { id } => write!(f, "participant {id} not found"),
            Self::NotBanned { id } => write!(f, "participant {id} is not banned"),
            Self::Directory(e) => write!(f, "directory error: {e}"),
            Self::ReportFailed { reason } => write!(f, "report append failed: {reason}"),
        }
    }
}

impl std::error::Error for ModerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Directory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::report::ReportStoreError> for ModerationError {
    fn from(e: crate::report::ReportStoreError) -> Self {
        Self::ReportFailed {
            reason: e.to_string(),
        }
    }
}

impl From<DirectoryError> for ModerationError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound { id } => Self::NotFound { id },
            DirectoryError::NotBanned { id } => Self::NotBanned { id },
            other => Self::Directory(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_display() {
        let err = ModerationError::Unauthorized {
            actor: ParticipantId::new(1),
        };
        assert!(err.to_string().contains("not authorized"));
    }

    #[test]
    fn directory_not_found_maps_to_not_found() {
        let err: ModerationError = DirectoryError::NotFound {
            id: ParticipantId::new(2),
        }
        .into();
        assert_eq!(
            err,
            ModerationError::NotFound {
                id: ParticipantId::new(2)
            }
        );
    }
}
