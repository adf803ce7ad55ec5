//! Combined queue + session state under one critical section.
//!
//! The waiting queue and session table are guarded together so the
//! composite pop-then-open sequence in the matching engine (and the
//! close-and-purge cascade in moderation) runs as a single logical
//! transaction. Two concurrent match requests can therefore never
//! both claim the same queue head.

use crate::error::StoreError;
use crate::queue::WaitingQueue;
use crate::session::SessionTable;
use crate::store::PairingStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Queue and session table behind a single lock.
#[derive(Debug, Default)]
pub struct PairingState {
    /// Participants waiting for a partner.
    pub queue: WaitingQueue,
    /// Active paired sessions.
    pub sessions: SessionTable,
}

impl PairingState {
    /// Creates empty pairing state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the state in the shared lock handle the engines expect.
    #[must_use]
    pub fn into_shared(self) -> Arc<Mutex<PairingState>> {
        Arc::new(Mutex::new(self))
    }

    /// Rebuilds pairing state from the store.
    ///
    /// The store holds one document per directed link, so a crash
    /// between the two writes of a session leaves an asymmetric pair.
    /// Hydration never trusts such a pair: the surviving link is
    /// deleted from the store and neither side ends up in a session.
    /// A participant holding both a ticket and a link similarly lost a
    /// cleanup write; the session wins and the stale ticket is dropped.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered; repair deletions are
    /// themselves best-effort.
    pub async fn hydrate(store: &dyn PairingStore) -> Result<Self, StoreError> {
        let mut state = Self::new();

        let links: std::collections::HashMap<_, _> =
            store.list_links().await?.into_iter().collect();
        for (&from, &to) in &links {
            // Insert each pair once, from its lexicographically first side.
            if from > to {
                continue;
            }
            if links.get(&to) == Some(&from) {
                if state.sessions.open(from, to).is_err() {
                    tracing::warn!(a = %from, b = %to, "conflicting session links, dropping");
                    let _ = store.delete_link(from).await;
                    let _ = store.delete_link(to).await;
                }
            } else {
                tracing::warn!(from = %from, to = %to, "half-open session link, repairing");
                let _ = store.delete_link(from).await;
            }
        }
        // Reverse direction of half-open pairs: `to` side survives alone.
        for (&from, &to) in &links {
            if from > to && links.get(&to) != Some(&from) {
                tracing::warn!(from = %from, to = %to, "half-open session link, repairing");
                let _ = store.delete_link(from).await;
            }
        }

        let mut tickets = store.list_tickets().await?;
        tickets.sort_by_key(|t| t.seq);
        for ticket in tickets {
            if state.sessions.partner_of(ticket.participant_id).is_some() {
                tracing::warn!(
                    participant = %ticket.participant_id,
                    "ticket for paired participant, dropping"
                );
                let _ = store.delete_ticket(ticket.participant_id).await;
                continue;
            }
            state.queue.restore(ticket);
        }

        Ok(state)
    }
}
