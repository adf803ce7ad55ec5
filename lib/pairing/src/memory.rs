//! In-memory pairing store.

use crate::error::StoreError;
use crate::store::PairingStore;
use crate::ticket::WaitingTicket;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use switchboard_core::ParticipantId;

/// A `PairingStore` holding tickets and links in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPairingStore {
    tickets: Arc<RwLock<HashMap<ParticipantId, WaitingTicket>>>,
    links: Arc<RwLock<HashMap<ParticipantId, ParticipantId>>>,
}

impl InMemoryPairingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a directed link directly, bypassing the session table.
    ///
    /// Test hook for constructing the asymmetric on-disk states that
    /// hydration must repair.
    pub fn seed_link(&self, from: ParticipantId, to: ParticipantId) {
        self.links.write().unwrap().insert(from, to);
    }
}

#[async_trait]
impl PairingStore for InMemoryPairingStore {
    async fn put_ticket(&self, ticket: WaitingTicket) -> Result<(), StoreError> {
        self.tickets
            .write()
            .unwrap()
            .insert(ticket.participant_id, ticket);
        Ok(())
    }

    async fn delete_ticket(&self, id: ParticipantId) -> Result<(), StoreError> {
        self.tickets.write().unwrap().remove(&id);
        Ok(())
    }

    async fn list_tickets(&self) -> Result<Vec<WaitingTicket>, StoreError> {
        Ok(self.tickets.read().unwrap().values().copied().collect())
    }

    async fn put_link(&self, from: ParticipantId, to: ParticipantId) -> Result<(), StoreError> {
        self.links.write().unwrap().insert(from, to);
        Ok(())
    }

    async fn delete_link(&self, from: ParticipantId) -> Result<(), StoreError> {
        self.links.write().unwrap().remove(&from);
        Ok(())
    }

    async fn list_links(&self) -> Result<Vec<(ParticipantId, ParticipantId)>, StoreError> {
        Ok(self
            .links
            .read()
            .unwrap()
            .iter()
            .map(|(&from, &to)| (from, to))
            .collect())
    }
}
