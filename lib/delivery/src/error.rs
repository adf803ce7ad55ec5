//! Error types for the delivery crate.

use std::fmt;
use switchboard_core::ParticipantId;

/// Errors from the message delivery collaborator.
///
/// Delivery failures are non-fatal to broker state: the operation that
/// produced one still completes its own state transition, and only the
/// notification side effect is reported as degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The platform rejected or failed the send.
    Failed {
        recipient: ParticipantId,
        reason: String,
    },
    /// The recipient cannot currently be reached (blocked the bot,
    /// deleted their account).
    Unreachable { recipient: ParticipantId },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { recipient, reason } => {
                write!(f, "delivery to {recipient} failed: {reason}")
            }
            Self::Unreachable { recipient } => {
                write!(f, "recipient {recipient} is unreachable")
            }
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Errors from the media store collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Upload to external storage failed.
    UploadFailed { path_hint: String, reason: String },
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UploadFailed { path_hint, reason } => {
                write!(f, "media upload for '{path_hint}' failed: {reason}")
            }
        }
    }
}

impl std::error::Error for MediaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_error_display() {
        let err = DeliveryError::Failed {
            recipient: ParticipantId::new(7),
            reason: "timeout".to_string(),
        };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn media_error_display() {
        let err = MediaError::UploadFailed {
            path_hint: "profile_photos/7.jpg".to_string(),
            reason: "quota exceeded".to_string(),
        };
        assert!(err.to_string().contains("profile_photos/7.jpg"));
    }
}
