//! Error types for the relay crate.

use std::fmt;
use switchboard_core::ParticipantId;
use switchboard_delivery::DeliveryError;

/// Errors from relay operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The participant has no active session. Informational, not
    /// fatal: the caller turns it into a notice to the participant.
    NotInSession { id: ParticipantId },
    /// The payload could not be handed to the platform. Core state is
    /// unaffected; only the send is degraded.
    Delivery(DeliveryError),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInSession { id } => write!(f, "participant {id} is not in a session"),
            Self::Delivery(e) => write!(f, "relay delivery failed: {e}"),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Delivery(e) => Some(e),
            Self::NotInSession { .. } => None,
        }
    }
}

impl From<DeliveryError> for RelayError {
    fn from(e: DeliveryError) -> Self {
        Self::Delivery(e)
    }
}
