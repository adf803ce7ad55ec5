//! Message delivery collaborator seam.
//!
//! The broker never talks to the chat platform directly; the adapter
//! supplies a `MessageDelivery` implementation. Sends are
//! fire-and-forget from the broker's perspective: failures are logged
//! and surfaced to the initiating participant, never retried here.

use crate::error::DeliveryError;
use crate::payload::{Payload, PayloadKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchboard_core::{ParticipantId, ReceiptId};

/// Proof that a payload was handed to the platform for a recipient.
///
/// Returned to the caller for optional archival by an external logging
/// collaborator; the broker itself keeps no copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Unique receipt identifier.
    pub id: ReceiptId,
    /// Who the payload was delivered to.
    pub recipient: ParticipantId,
    /// What kind of payload was delivered.
    pub kind: PayloadKind,
    /// When the platform accepted the send.
    pub delivered_at: DateTime<Utc>,
}

impl DeliveryReceipt {
    /// Creates a receipt for a completed send.
    #[must_use]
    pub fn new(recipient: ParticipantId, kind: PayloadKind) -> Self {
        Self {
            id: ReceiptId::new(),
            recipient,
            kind,
            delivered_at: Utc::now(),
        }
    }
}

/// Trait for delivering payloads to participants.
///
/// Implemented by the bot-platform adapter; the in-memory test doubles
/// live next to the engines that exercise them.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    /// Delivers a payload to a participant.
    async fn send(
        &self,
        recipient: ParticipantId,
        payload: Payload,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
