//! The waiting queue.
//!
//! FIFO by logical enqueue order, keyed by participant id, with the
//! invariant that an id appears at most once.

use crate::ticket::WaitingTicket;
use std::collections::{BTreeMap, HashMap};
use switchboard_core::ParticipantId;

/// FIFO queue of participants seeking a partner.
#[derive(Debug, Default)]
pub struct WaitingQueue {
    /// Tickets ordered by logical order key.
    order: BTreeMap<u64, ParticipantId>,
    /// Ticket lookup by participant.
    by_participant: HashMap<ParticipantId, WaitingTicket>,
    /// Next order key to hand out.
    next_seq: u64,
}

impl WaitingQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a ticket for the participant, or returns the existing
    /// one unchanged (at most one ticket per participant).
    pub fn enqueue(&mut self, id: ParticipantId) -> WaitingTicket {
        if let Some(existing) = self.by_participant.get(&id) {
            return *existing;
        }
        let ticket = WaitingTicket::new(id, self.next_seq);
        self.next_seq += 1;
        self.order.insert(ticket.seq, id);
        self.by_participant.insert(id, ticket);
        ticket
    }

    /// Removes and returns the earliest ticket, or `None` if empty.
    pub fn dequeue_oldest(&mut self) -> Option<WaitingTicket> {
        let (&seq, &id) = self.order.iter().next()?;
        self.order.remove(&seq);
        self.by_participant.remove(&id)
    }

    /// Re-inserts a previously dequeued ticket at its original order
    /// key, preserving its queue position.
    ///
    /// Used by the self-match guard so a requester whose own ticket was
    /// popped is never left unqueued. No-op when the participant
    /// already holds a ticket.
    pub fn restore(&mut self, ticket: WaitingTicket) {
        if self.by_participant.contains_key(&ticket.participant_id) {
            return;
        }
        self.next_seq = self.next_seq.max(ticket.seq + 1);
        self.order.insert(ticket.seq, ticket.participant_id);
        self.by_participant.insert(ticket.participant_id, ticket);
    }

    /// Removes the participant's ticket if present. Idempotent.
    ///
    /// Returns true when a ticket was removed.
    pub fn remove(&mut self, id: ParticipantId) -> bool {
        match self.by_participant.remove(&id) {
            Some(ticket) => {
                self.order.remove(&ticket.seq);
                true
            }
            None => false,
        }
    }

    /// Returns true if the participant holds a ticket.
    #[must_use]
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.by_participant.contains_key(&id)
    }

    /// Returns the number of queued participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no one is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates tickets in FIFO order.
    pub fn tickets(&self) -> impl Iterator<Item = &WaitingTicket> {
        self.order.values().map(|id| &self.by_participant[id])
    }
}
