//! Persistence seam for the participant directory.
//!
//! The directory is backed by an external keyed-document service with
//! two logical collections: registered participants and banned
//! participants, both keyed by participant id.

use crate::error::StoreError;
use crate::participant::Participant;
use async_trait::async_trait;
use switchboard_core::ParticipantId;

/// Trait for directory persistence.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Writes a record to the registered collection.
    async fn put_registered(&self, participant: Participant) -> Result<(), StoreError>;

    /// Reads a record from the registered collection.
    async fn get_registered(&self, id: ParticipantId) -> Result<Option<Participant>, StoreError>;

    /// Deletes a record from the registered collection. Idempotent.
    async fn delete_registered(&self, id: ParticipantId) -> Result<(), StoreError>;

    /// Lists all registered records. Order not significant.
    async fn list_registered(&self) -> Result<Vec<Participant>, StoreError>;

    /// Writes a record to the banned collection.
    async fn put_banned(&self, participant: Participant) -> Result<(), StoreError>;

    /// Reads a record from the banned collection.
    async fn get_banned(&self, id: ParticipantId) -> Result<Option<Participant>, StoreError>;

    /// Deletes a record from the banned collection. Idempotent.
    async fn delete_banned(&self, id: ParticipantId) -> Result<(), StoreError>;

    /// Lists all banned records. Order not significant.
    async fn list_banned(&self) -> Result<Vec<Participant>, StoreError>;
}
