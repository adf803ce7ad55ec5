//! The session table.
//!
//! An active session is an unordered pair of participants stored as
//! two symmetric directed links, so lookup by either side is O(1).
//! Both directions are inserted and removed together; a caller never
//! observes a half-open session in memory.

use crate::error::SessionError;
use std::collections::HashMap;
use switchboard_core::ParticipantId;

/// Active paired sessions as directed partner links.
#[derive(Debug, Default)]
pub struct SessionTable {
    links: HashMap<ParticipantId, ParticipantId>,
}

impl SessionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session between two participants, inserting both
    /// directed links atomically.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInSession` naming the occupied side if either
    /// participant already has a partner; the table is left untouched.
    pub fn open(&mut self, a: ParticipantId, b: ParticipantId) -> Result<(), SessionError> {
        debug_assert_ne!(a, b, "self-pairing must be guarded by the caller");
        if self.links.contains_key(&a) {
            return Err(SessionError::AlreadyInSession { id: a });
        }
        if self.links.contains_key(&b) {
            return Err(SessionError::AlreadyInSession { id: b });
        }
        self.links.insert(a, b);
        self.links.insert(b, a);
        Ok(())
    }

    /// Returns the partner of the participant, if in a session.
    #[must_use]
    pub fn partner_of(&self, id: ParticipantId) -> Option<ParticipantId> {
        self.links.get(&id).copied()
    }

    /// Closes the participant's session, removing both directed links.
    ///
    /// Returns the partner id so the caller can notify it, or `None`
    /// if the participant had no session.
    pub fn close(&mut self, id: ParticipantId) -> Option<ParticipantId> {
        let partner = self.links.remove(&id)?;
        self.links.remove(&partner);
        Some(partner)
    }

    /// Returns the number of directed links (twice the session count).
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Iterates all directed links.
    pub fn links(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.links.iter().map(|(&from, &to)| (from, to))
    }
}
