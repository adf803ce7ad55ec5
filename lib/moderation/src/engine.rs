//! The moderation engine.
//!
//! Bans and unbans participants and forcibly closes their sessions.
//! The ban state transition always commits: failed notifications only
//! degrade the side effects, never the ban itself.

use crate::error::ModerationError;
use crate::report::{ReportRecord, ReportStore};
use std::collections::HashSet;
use std::sync::Arc;
use switchboard_core::ParticipantId;
use switchboard_delivery::{MessageDelivery, Payload};
use switchboard_directory::{Directory, Participant};
use switchboard_pairing::{PairingState, PairingStore};
use tokio::sync::Mutex;

/// User-facing notice texts sent by the moderation engine.
#[derive(Debug, Clone)]
pub struct ModerationNotices {
    /// Sent to the partner of a banned participant.
    pub partner_left: String,
}

impl Default for ModerationNotices {
    fn default() -> Self {
        Self {
            partner_left: "Your partner has left the chat.".to_string(),
        }
    }
}

/// What a ban accomplished besides the directory transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanOutcome {
    /// The banned record, as snapshotted into the banned set.
    pub banned: Participant,
    /// The partner whose session was forcibly closed, if any.
    pub closed_partner: Option<ParticipantId>,
    /// Whether a waiting ticket was removed.
    pub removed_ticket: bool,
}

/// Bans, unbans, and the report log.
pub struct ModerationEngine {
    directory: Arc<Directory>,
    state: Arc<Mutex<PairingState>>,
    store: Arc<dyn PairingStore>,
    delivery: Arc<dyn MessageDelivery>,
    reports: Arc<dyn ReportStore>,
    administrators: HashSet<ParticipantId>,
    notices: ModerationNotices,
}

impl ModerationEngine {
    /// Creates a moderation engine with a fixed administrator allowlist.
    pub fn new(
        directory: Arc<Directory>,
        state: Arc<Mutex<PairingState>>,
        store: Arc<dyn PairingStore>,
        delivery: Arc<dyn MessageDelivery>,
        reports: Arc<dyn ReportStore>,
        administrators: impl IntoIterator<Item = ParticipantId>,
        notices: ModerationNotices,
    ) -> Self {
        Self {
            directory,
            state,
            store,
            delivery,
            reports,
            administrators: administrators.into_iter().collect(),
            notices,
        }
    }

    /// Returns true if the participant is in the administrator allowlist.
    #[must_use]
    pub fn is_admin(&self, id: ParticipantId) -> bool {
        self.administrators.contains(&id)
    }

    /// Bans a participant: directory transition, forced session close,
    /// waiting-ticket purge.
    ///
    /// The displaced partner is notified best-effort; the ban commits
    /// regardless of delivery outcomes.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` unless the actor is an administrator, or
    /// `NotFound` when the target has no registered record. Both are
    /// rejected before any state changes.
    pub async fn ban_participant(
        &self,
        actor: ParticipantId,
        target: ParticipantId,
    ) -> Result<BanOutcome, ModerationError> {
        if !self.is_admin(actor) {
            return Err(ModerationError::Unauthorized { actor });
        }

        let banned = self.directory.ban(target).await?;

        // Purge queue and session membership in one critical section;
        // the directory does not cascade.
        let mut state = self.state.lock().await;
        let closed_partner = state.sessions.close(target);
        let removed_ticket = state.queue.remove(target);
        if let Some(partner) = closed_partner {
            for side in [target, partner] {
                if let Err(e) = self.store.delete_link(side).await {
                    tracing::warn!(participant = %side, error = %e, "link delete write-through failed");
                }
            }
        }
        if removed_ticket {
            if let Err(e) = self.store.delete_ticket(target).await {
                tracing::warn!(participant = %target, error = %e, "ticket delete write-through failed");
            }
        }
        drop(state);

        tracing::info!(actor = %actor, target = %target, "participant banned");
        if let Some(partner) = closed_partner {
            if let Err(e) = self
                .delivery
                .send(partner, Payload::text(&self.notices.partner_left))
                .await
            {
                tracing::warn!(recipient = %partner, error = %e, "notification not delivered");
            }
        }

        Ok(BanOutcome {
            banned,
            closed_partner,
            removed_ticket,
        })
    }

    /// Restores a banned participant to Registered.
    ///
    /// Does not re-enqueue or re-pair: the participant starts over.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` unless the actor is an administrator, or
    /// `NotBanned` when the target is absent from the banned set.
    pub async fn unban_participant(
        &self,
        actor: ParticipantId,
        target: ParticipantId,
    ) -> Result<Participant, ModerationError> {
        if !self.is_admin(actor) {
            return Err(ModerationError::Unauthorized { actor });
        }
        let restored = self.directory.unban(target).await?;
        tracing::info!(actor = %actor, target = %target, "participant unbanned");
        Ok(restored)
    }

    /// Lists banned participant ids. Order not significant.
    ///
    /// # Errors
    ///
    /// Returns `Directory` when the banned collection cannot be read.
    pub async fn list_banned(&self) -> Result<Vec<ParticipantId>, ModerationError> {
        Ok(self
            .directory
            .list_banned()
            .await?
            .into_iter()
            .map(|p| p.id())
            .collect())
    }

    /// Files a report from a participant.
    ///
    /// The reporter's current partner, when they are in a session, is
    /// captured as the reported party.
    ///
    /// # Errors
    ///
    /// Returns `ReportFailed` when the log rejects the append.
    pub async fn record_report(
        &self,
        reporter: ParticipantId,
        text: impl Into<String> + Send,
    ) -> Result<ReportRecord, ModerationError> {
        let reported = self.state.lock().await.sessions.partner_of(reporter);
        let record = ReportRecord::new(reporter, reported, text);
        self.reports.append(record.clone()).await?;
        tracing::info!(reporter = %reporter, report = %record.id, "report filed");
        Ok(record)
    }
}
