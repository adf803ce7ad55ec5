//! The broker-level error type.
//!
//! Each component crate keeps its own error enum; the broker wraps them
//! so callers get a single type at the facade seam.

use std::fmt;
use switchboard_directory::DirectoryError;
use switchboard_moderation::ModerationError;
use switchboard_pairing::{MatchError, StoreError};
use switchboard_relay::RelayError;

/// Errors surfaced by broker operations.
#[derive(Debug)]
pub enum BrokerError {
    /// A match request was rejected.
    Match(MatchError),
    /// A relay or session-close failed.
    Relay(RelayError),
    /// A moderation operation was rejected.
    Moderation(ModerationError),
    /// A directory lookup or write failed.
    Directory(DirectoryError),
    /// Pairing state could not be loaded from the store.
    Hydration(StoreError),
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match(e) => write!(f, "match request failed: {e}"),
            Self::Relay(e) => write!(f, "relay failed: {e}"),
            Self::Moderation(e) => write!(f, "moderation failed: {e}"),
            Self::Directory(e) => write!(f, "directory operation failed: {e}"),
            Self::Hydration(e) => write!(f, "pairing state hydration failed: {e}"),
        }
    }
}

impl std::error::Error for BrokerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Match(e) => Some(e),
            Self::Relay(e) => Some(e),
            Self::Moderation(e) => Some(e),
            Self::Directory(e) => Some(e),
            Self::Hydration(e) => Some(e),
        }
    }
}

impl From<MatchError> for BrokerError {
    fn from(e: MatchError) -> Self {
        Self::Match(e)
    }
}

impl From<RelayError> for BrokerError {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

impl From<ModerationError> for BrokerError {
    fn from(e: ModerationError) -> Self {
        Self::Moderation(e)
    }
}

impl From<DirectoryError> for BrokerError {
    fn from(e: DirectoryError) -> Self {
        Self::Directory(e)
    }
}

impl From<StoreError> for BrokerError {
    fn from(e: StoreError) -> Self {
        Self::Hydration(e)
    }
}
