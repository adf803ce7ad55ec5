//! Waiting tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchboard_core::ParticipantId;

/// A queued request for matching.
///
/// `seq` is the logical order key: a monotonic counter assigned at
/// enqueue time. Wall-clock time is recorded for observability only
/// and never used for ordering, so timestamp collisions cannot break
/// FIFO fairness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingTicket {
    /// Who is waiting.
    pub participant_id: ParticipantId,
    /// Logical order key. Lower means earlier.
    pub seq: u64,
    /// When the ticket was created.
    pub enqueued_at: DateTime<Utc>,
}

impl WaitingTicket {
    /// Creates a ticket with the given order key.
    #[must_use]
    pub fn new(participant_id: ParticipantId, seq: u64) -> Self {
        Self {
            participant_id,
            seq,
            enqueued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_serde_roundtrip() {
        let ticket = WaitingTicket::new(ParticipantId::new(1), 4);
        let json = serde_json::to_string(&ticket).expect("serialize");
        let parsed: WaitingTicket = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(ticket, parsed);
    }
}
