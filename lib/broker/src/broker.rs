//! The broker facade.
//!
//! Composes the directory, matching engine, relay dispatcher, and
//! moderation engine behind one API, so a transport adapter only ever
//! talks to [`Broker`].
//!
//! Pairing state is hydrated from the pairing store at construction,
//! so queued tickets and open sessions survive a restart.

use crate::config::{BrokerConfig, NoticeConfig};
use crate::error::BrokerError;
use std::sync::Arc;
use switchboard_core::ParticipantId;
use switchboard_delivery::{DeliveryReceipt, MediaStore, MessageDelivery, Payload};
use switchboard_directory::{Directory, DirectoryError, DirectoryStore, MediaRef, Participant};
use switchboard_moderation::{
    BanOutcome, ModerationEngine, ModerationNotices, ReportRecord, ReportStore,
};
use switchboard_pairing::{
    MatchNotices, MatchOutcome, MatchingEngine, PairingState, PairingStore, ProfileUpdate,
};
use switchboard_relay::{RelayDispatcher, RelayError, RelayNotices};
use tokio::sync::Mutex;

/// Per-recipient outcome summary of a broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients the broadcast reached.
    pub delivered: Vec<ParticipantId>,
    /// Recipients it did not reach, with the delivery failure text.
    pub failed: Vec<(ParticipantId, String)>,
}

impl BroadcastReport {
    /// Number of recipients reached.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        self.delivered.len()
    }

    /// Number of recipients not reached.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// The pairing and session broker.
pub struct Broker {
    directory: Arc<Directory>,
    state: Arc<Mutex<PairingState>>,
    delivery: Arc<dyn MessageDelivery>,
    media: Arc<dyn MediaStore>,
    matching: MatchingEngine,
    relay: RelayDispatcher,
    moderation: ModerationEngine,
    notices: NoticeConfig,
}

impl Broker {
    /// Builds a broker over the given stores and collaborators,
    /// hydrating pairing state from the pairing store.
    ///
    /// # Errors
    ///
    /// Returns `Hydration` when the pairing store cannot be read.
    pub async fn new(
        directory_store: Arc<dyn DirectoryStore>,
        pairing_store: Arc<dyn PairingStore>,
        delivery: Arc<dyn MessageDelivery>,
        media: Arc<dyn MediaStore>,
        reports: Arc<dyn ReportStore>,
        config: BrokerConfig,
    ) -> Result<Self, BrokerError> {
        let directory = Arc::new(Directory::new(directory_store));
        let state = PairingState::hydrate(pairing_store.as_ref())
            .await?
            .into_shared();
        let notices = config.notices.clone();

        let matching = MatchingEngine::new(
            Arc::clone(&directory),
            Arc::clone(&state),
            Arc::clone(&pairing_store),
            Arc::clone(&delivery),
            Arc::clone(&media),
            MatchNotices {
                partner_found: notices.partner_found.clone(),
                waiting: notices.waiting.clone(),
                still_searching: notices.still_searching.clone(),
            },
        );
        let relay = RelayDispatcher::new(
            Arc::clone(&state),
            Arc::clone(&pairing_store),
            Arc::clone(&delivery),
            RelayNotices {
                partner_left: notices.partner_left.clone(),
                session_ended: notices.session_ended.clone(),
                location_sent: notices.location_sent.clone(),
                location_received: notices.location_received.clone(),
            },
        );
        let moderation = ModerationEngine::new(
            Arc::clone(&directory),
            Arc::clone(&state),
            Arc::clone(&pairing_store),
            Arc::clone(&delivery),
            reports,
            config.administrator_ids(),
            ModerationNotices {
                partner_left: notices.partner_left.clone(),
            },
        );

        Ok(Self {
            directory,
            state,
            delivery,
            media,
            matching,
            relay,
            moderation,
            notices,
        })
    }

    /// Registers a participant (or refreshes an existing registration)
    /// and sends the welcome notice.
    ///
    /// The avatar upload and the welcome notice are best-effort; the
    /// registration itself is the operation's outcome.
    ///
    /// # Errors
    ///
    /// Returns `Directory` when the id is banned or the record cannot
    /// be written.
    pub async fn register(
        &self,
        id: ParticipantId,
        display_name: impl Into<String> + Send,
        avatar: Option<&[u8]>,
    ) -> Result<Participant, BrokerError> {
        let mut participant = self.directory.register(id, display_name).await?;

        if let Some(bytes) = avatar {
            let digest = self.media.digest(bytes);
            let unchanged = participant
                .media_ref()
                .is_some_and(|m| m.digest == digest);
            if !unchanged {
                let path_hint = format!("profile_photos/{id}.jpg");
                match self.media.upload(bytes, &path_hint).await {
                    Ok(url) => {
                        match self
                            .directory
                            .update_profile(id, None, Some(MediaRef::new(url, digest)))
                            .await
                        {
                            Ok(updated) => participant = updated,
                            Err(e) => {
                                tracing::warn!(participant = %id, error = %e, "avatar reference not saved");
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(participant = %id, error = %e, "avatar upload failed");
                    }
                }
            }
        }

        if let Err(e) = self
            .delivery
            .send(id, Payload::text(&self.notices.welcome))
            .await
        {
            tracing::warn!(recipient = %id, error = %e, "welcome notice not delivered");
        }

        tracing::info!(participant = %id, "participant registered");
        Ok(participant)
    }

    /// Requests a match for the participant. See
    /// [`MatchingEngine::request_match`] for the pairing algorithm.
    ///
    /// # Errors
    ///
    /// Returns `Match` when the requester is banned, unregistered, or
    /// already paired.
    pub async fn request_match(
        &self,
        id: ParticipantId,
        profile: Option<ProfileUpdate>,
    ) -> Result<MatchOutcome, BrokerError> {
        Ok(self.matching.request_match(id, profile).await?)
    }

    /// Removes the participant's waiting ticket, if any. Idempotent.
    pub async fn cancel_match(&self, id: ParticipantId) -> bool {
        self.matching.cancel_match(id).await
    }

    /// Closes the participant's session and notifies both sides.
    ///
    /// # Errors
    ///
    /// Returns `Relay` when the participant has no open session.
    pub async fn end_session(&self, id: ParticipantId) -> Result<ParticipantId, BrokerError> {
        Ok(self.relay.end_session(id).await?)
    }

    /// Closes the current session (when one exists) and immediately
    /// requests a new match.
    ///
    /// # Errors
    ///
    /// Returns `Match` when the follow-up match request is rejected.
    pub async fn end_and_rematch(
        &self,
        id: ParticipantId,
        profile: Option<ProfileUpdate>,
    ) -> Result<MatchOutcome, BrokerError> {
        match self.relay.end_session(id).await {
            Ok(_) | Err(RelayError::NotInSession { .. }) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(self.matching.request_match(id, profile).await?)
    }

    /// Relays a payload from a participant to their partner.
    ///
    /// # Errors
    ///
    /// Returns `Relay` when the sender has no open session or the
    /// partner is unreachable.
    pub async fn relay(
        &self,
        sender: ParticipantId,
        payload: Payload,
    ) -> Result<Vec<DeliveryReceipt>, BrokerError> {
        Ok(self.relay.relay(sender, payload).await?)
    }

    /// Returns the participant's registered record, if any.
    ///
    /// # Errors
    ///
    /// Returns `Directory` when the registered collection cannot be
    /// read.
    pub async fn get_profile(
        &self,
        id: ParticipantId,
    ) -> Result<Option<Participant>, BrokerError> {
        Ok(self.directory.get(id).await?)
    }

    /// Returns the record of the participant's current partner.
    ///
    /// # Errors
    ///
    /// Returns `Relay` when the participant has no open session, and
    /// `Directory` when the partner has no registered record.
    pub async fn get_partner_profile(
        &self,
        id: ParticipantId,
    ) -> Result<Participant, BrokerError> {
        let partner = self
            .state
            .lock()
            .await
            .sessions
            .partner_of(id)
            .ok_or(RelayError::NotInSession { id })?;
        self.directory
            .get(partner)
            .await?
            .ok_or_else(|| DirectoryError::NotFound { id: partner }.into())
    }

    /// Bans a participant. See [`ModerationEngine::ban_participant`].
    ///
    /// # Errors
    ///
    /// Returns `Moderation` when the actor is not an administrator or
    /// the target is unknown.
    pub async fn ban(
        &self,
        actor: ParticipantId,
        target: ParticipantId,
    ) -> Result<BanOutcome, BrokerError> {
        Ok(self.moderation.ban_participant(actor, target).await?)
    }

    /// Unbans a participant.
    ///
    /// # Errors
    ///
    /// Returns `Moderation` when the actor is not an administrator or
    /// the target is not banned.
    pub async fn unban(
        &self,
        actor: ParticipantId,
        target: ParticipantId,
    ) -> Result<Participant, BrokerError> {
        Ok(self.moderation.unban_participant(actor, target).await?)
    }

    /// Lists banned participant ids.
    ///
    /// # Errors
    ///
    /// Returns `Moderation` when the banned collection cannot be read.
    pub async fn list_banned(&self) -> Result<Vec<ParticipantId>, BrokerError> {
        Ok(self.moderation.list_banned().await?)
    }

    /// Sends a text notice to every registered participant,
    /// sequentially, continuing past individual failures.
    ///
    /// # Errors
    ///
    /// Returns `Moderation` when the actor is not an administrator,
    /// and `Directory` when the registered collection cannot be read.
    pub async fn broadcast(
        &self,
        actor: ParticipantId,
        text: &str,
    ) -> Result<BroadcastReport, BrokerError> {
        use switchboard_moderation::ModerationError;

        if !self.moderation.is_admin(actor) {
            return Err(ModerationError::Unauthorized { actor }.into());
        }

        let mut report = BroadcastReport::default();
        for participant in self.directory.list_registered().await? {
            let recipient = participant.id();
            match self.delivery.send(recipient, Payload::text(text)).await {
                Ok(_) => report.delivered.push(recipient),
                Err(e) => {
                    tracing::warn!(recipient = %recipient, error = %e, "broadcast delivery failed");
                    report.failed.push((recipient, e.to_string()));
                }
            }
        }
        tracing::info!(
            actor = %actor,
            delivered = report.delivered_count(),
            failed = report.failed_count(),
            "broadcast complete"
        );
        Ok(report)
    }

    /// Files a report from a participant, capturing their current
    /// partner as the reported party when one exists.
    ///
    /// # Errors
    ///
    /// Returns `Moderation` when the report log rejects the append.
    pub async fn report(
        &self,
        reporter: ParticipantId,
        text: impl Into<String> + Send,
    ) -> Result<ReportRecord, BrokerError> {
        Ok(self.moderation.record_report(reporter, text).await?)
    }
}
