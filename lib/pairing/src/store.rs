//! Persistence seam for queue and session state.
//!
//! Two logical collections in the external keyed-document service:
//! waiting tickets and directed session links, both keyed by
//! participant id. The two links of a session are separate documents,
//! which is why hydration must treat an asymmetric pair as half-open
//! and repair it.

use crate::error::StoreError;
use crate::ticket::WaitingTicket;
use async_trait::async_trait;
use switchboard_core::ParticipantId;

/// Trait for pairing-state persistence.
#[async_trait]
pub trait PairingStore: Send + Sync {
    /// Writes a waiting ticket.
    async fn put_ticket(&self, ticket: WaitingTicket) -> Result<(), StoreError>;

    /// Deletes a participant's waiting ticket. Idempotent.
    async fn delete_ticket(&self, id: ParticipantId) -> Result<(), StoreError>;

    /// Lists all waiting tickets, in no particular order.
    async fn list_tickets(&self) -> Result<Vec<WaitingTicket>, StoreError>;

    /// Writes one directed session link.
    async fn put_link(&self, from: ParticipantId, to: ParticipantId) -> Result<(), StoreError>;

    /// Deletes the directed link keyed by `from`. Idempotent.
    async fn delete_link(&self, from: ParticipantId) -> Result<(), StoreError>;

    /// Lists all directed links, in no particular order.
    async fn list_links(&self) -> Result<Vec<(ParticipantId, ParticipantId)>, StoreError>;
}
