//! The relay dispatcher.
//!
//! Forwards in-session content from sender to partner and handles
//! explicit session teardown. Delivery failures never unwind state:
//! a closed session stays closed even when the goodbye notice is lost.

use crate::error::RelayError;
use std::sync::Arc;
use switchboard_core::ParticipantId;
use switchboard_delivery::{DeliveryReceipt, MessageDelivery, Payload};
use switchboard_pairing::{PairingState, PairingStore};
use tokio::sync::Mutex;

/// User-facing notice texts sent by the relay dispatcher.
#[derive(Debug, Clone)]
pub struct RelayNotices {
    /// Sent to the remaining partner when a session is closed.
    pub partner_left: String,
    /// Acknowledgment sent to whoever closed the session.
    pub session_ended: String,
    /// Prefix of the map-link text sent back to a location's sender.
    pub location_sent: String,
    /// Prefix of the map-link text sent to the location's recipient.
    pub location_received: String,
}

impl Default for RelayNotices {
    fn default() -> Self {
        Self {
            partner_left: "Your partner has left the chat.".to_string(),
            session_ended: "Chat ended. Use /search to find a new partner.".to_string(),
            location_sent: "Location delivered to your partner.".to_string(),
            location_received: "You received a location!".to_string(),
        }
    }
}

/// Forwards in-session messages and tears sessions down.
pub struct RelayDispatcher {
    state: Arc<Mutex<PairingState>>,
    store: Arc<dyn PairingStore>,
    delivery: Arc<dyn MessageDelivery>,
    notices: RelayNotices,
}

impl RelayDispatcher {
    /// Creates a dispatcher over shared pairing state.
    pub fn new(
        state: Arc<Mutex<PairingState>>,
        store: Arc<dyn PairingStore>,
        delivery: Arc<dyn MessageDelivery>,
        notices: RelayNotices,
    ) -> Self {
        Self {
            state,
            store,
            delivery,
            notices,
        }
    }

    /// Closes the participant's session.
    ///
    /// The partner gets a "partner left" notice and the caller an
    /// acknowledgment, both best-effort. Returns the former partner.
    ///
    /// # Errors
    ///
    /// Returns `NotInSession` when there is nothing to close; calling
    /// again after a close reports the same, with no further effect.
    pub async fn end_session(&self, id: ParticipantId) -> Result<ParticipantId, RelayError> {
        let mut state = self.state.lock().await;
        let Some(partner) = state.sessions.close(id) else {
            return Err(RelayError::NotInSession { id });
        };
        for side in [id, partner] {
            if let Err(e) = self.store.delete_link(side).await {
                tracing::warn!(participant = %side, error = %e, "link delete write-through failed");
            }
        }
        drop(state);

        tracing::info!(a = %id, b = %partner, "session closed");
        self.notify(id, &self.notices.session_ended).await;
        self.notify(partner, &self.notices.partner_left).await;
        Ok(partner)
    }

    /// Relays a payload from sender to partner.
    ///
    /// The payload is forwarded unchanged. A location additionally
    /// produces a derived map-link text delivered to BOTH parties;
    /// every other kind goes to the partner alone. Returns the
    /// receipts for optional archival by an external logger.
    ///
    /// # Errors
    ///
    /// Returns `NotInSession` when the sender has no partner, or
    /// `Delivery` when the platform refuses the forward itself (the
    /// map-link fan-out is best-effort and never fails the relay).
    pub async fn relay(
        &self,
        sender: ParticipantId,
        payload: Payload,
    ) -> Result<Vec<DeliveryReceipt>, RelayError> {
        let partner = {
            let state = self.state.lock().await;
            state
                .sessions
                .partner_of(sender)
                .ok_or(RelayError::NotInSession { id: sender })?
        };

        let mut receipts = Vec::with_capacity(1);
        receipts.push(self.delivery.send(partner, payload.clone()).await?);

        match &payload {
            Payload::Location { .. } => {
                // map_link is always present for locations.
                let link = payload.map_link().unwrap_or_default();
                let to_partner = format!("{}\n{link}", self.notices.location_received);
                let to_sender = format!("{}\n{link}", self.notices.location_sent);
                if let Ok(receipt) = self.try_send(partner, &to_partner).await {
                    receipts.push(receipt);
                }
                if let Ok(receipt) = self.try_send(sender, &to_sender).await {
                    receipts.push(receipt);
                }
            }
            Payload::Text { .. }
            | Payload::Photo { .. }
            | Payload::Voice { .. }
            | Payload::Sticker { .. } => {}
        }

        tracing::debug!(
            sender = %sender,
            partner = %partner,
            kind = %payload.kind(),
            "relayed payload"
        );
        Ok(receipts)
    }

    async fn try_send(
        &self,
        recipient: ParticipantId,
        text: &str,
    ) -> Result<DeliveryReceipt, RelayError> {
        match self.delivery.send(recipient, Payload::text(text)).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                tracing::warn!(recipient = %recipient, error = %e, "map-link fan-out not delivered");
                Err(e.into())
            }
        }
    }

    async fn notify(&self, recipient: ParticipantId, text: &str) {
        if let Err(e) = self.delivery.send(recipient, Payload::text(text)).await {
            tracing::warn!(recipient = %recipient, error = %e, "notification not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use switchboard_delivery::{DeliveryError, PayloadKind};
    use switchboard_pairing::InMemoryPairingStore;

    #[derive(Default)]
    struct RecordingDelivery {
        sent: StdMutex<Vec<(ParticipantId, Payload)>>,
        fail_for: Option<ParticipantId>,
    }

    impl RecordingDelivery {
        fn failing_for(id: ParticipantId) -> Self {
            Self {
                sent: StdMutex::new(Vec::new()),
                fail_for: Some(id),
            }
        }

        fn sent_to(&self, id: ParticipantId) -> Vec<Payload> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(recipient, _)| *recipient == id)
                .map(|(_, payload)| payload.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MessageDelivery for RecordingDelivery {
        async fn send(
            &self,
            recipient: ParticipantId,
            payload: Payload,
        ) -> Result<DeliveryReceipt, DeliveryError> {
            if self.fail_for == Some(recipient) {
                return Err(DeliveryError::Unreachable { recipient });
            }
            let kind = payload.kind();
            self.sent.lock().unwrap().push((recipient, payload));
            Ok(DeliveryReceipt::new(recipient, kind))
        }
    }

    struct Fixture {
        state: Arc<Mutex<PairingState>>,
        store: Arc<InMemoryPairingStore>,
        delivery: Arc<RecordingDelivery>,
        dispatcher: RelayDispatcher,
    }

    fn fixture_with(delivery: RecordingDelivery) -> Fixture {
        let state = PairingState::new().into_shared();
        let store = Arc::new(InMemoryPairingStore::new());
        let delivery = Arc::new(delivery);
        let dispatcher = RelayDispatcher::new(
            Arc::clone(&state),
            Arc::clone(&store) as Arc<dyn PairingStore>,
            Arc::clone(&delivery) as Arc<dyn MessageDelivery>,
            RelayNotices::default(),
        );
        Fixture {
            state,
            store,
            delivery,
            dispatcher,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingDelivery::default())
    }

    async fn pair(fx: &Fixture, a: ParticipantId, b: ParticipantId) {
        fx.state.lock().await.sessions.open(a, b).unwrap();
        fx.store.put_link(a, b).await.unwrap();
        fx.store.put_link(b, a).await.unwrap();
    }

    #[tokio::test]
    async fn relay_forwards_payload_unchanged() {
        let fx = fixture();
        let (a, b) = (ParticipantId::new(1), ParticipantId::new(2));
        pair(&fx, a, b).await;

        let receipts = fx
            .dispatcher
            .relay(a, Payload::voice("file_99"))
            .await
            .unwrap();

        assert_eq!(receipts.len(), 1);
        assert_eq!(fx.delivery.sent_to(b), vec![Payload::voice("file_99")]);
        assert!(fx.delivery.sent_to(a).is_empty());
    }

    #[tokio::test]
    async fn relay_without_session_is_rejected() {
        let fx = fixture();
        let err = fx
            .dispatcher
            .relay(ParticipantId::new(1), Payload::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::NotInSession { .. }));
    }

    #[tokio::test]
    async fn location_fans_out_map_link_to_both_sides() {
        let fx = fixture();
        let (a, b) = (ParticipantId::new(1), ParticipantId::new(2));
        pair(&fx, a, b).await;

        let receipts = fx
            .dispatcher
            .relay(a, Payload::location(-6.2, 106.8))
            .await
            .unwrap();

        assert_eq!(receipts.len(), 3);
        // Partner: the location itself plus the link text.
        let to_partner = fx.delivery.sent_to(b);
        assert_eq!(to_partner.len(), 2);
        assert_eq!(to_partner[0].kind(), PayloadKind::Location);
        assert!(matches!(
            &to_partner[1],
            Payload::Text { text } if text.contains("maps?q=-6.2,106.8")
        ));
        // Sender: the link text only.
        let to_sender = fx.delivery.sent_to(a);
        assert_eq!(to_sender.len(), 1);
        assert!(matches!(
            &to_sender[0],
            Payload::Text { text } if text.contains("maps?q=-6.2,106.8")
        ));
    }

    #[tokio::test]
    async fn delivery_failure_surfaces_without_closing_session() {
        let (a, b) = (ParticipantId::new(1), ParticipantId::new(2));
        let fx = fixture_with(RecordingDelivery::failing_for(b));
        pair(&fx, a, b).await;

        let err = fx.dispatcher.relay(a, Payload::text("hi")).await.unwrap_err();
        assert!(matches!(err, RelayError::Delivery(_)));
        // The session survives the failed send.
        assert_eq!(fx.state.lock().await.sessions.partner_of(a), Some(b));
    }

    #[tokio::test]
    async fn end_session_notifies_both_sides_and_clears_links() {
        let fx = fixture();
        let (a, b) = (ParticipantId::new(1), ParticipantId::new(2));
        pair(&fx, a, b).await;

        let partner = fx.dispatcher.end_session(a).await.unwrap();

        assert_eq!(partner, b);
        let state = fx.state.lock().await;
        assert_eq!(state.sessions.partner_of(a), None);
        assert_eq!(state.sessions.partner_of(b), None);
        drop(state);
        assert!(fx.store.list_links().await.unwrap().is_empty());
        assert_eq!(fx.delivery.sent_to(a).len(), 1);
        assert_eq!(fx.delivery.sent_to(b).len(), 1);
    }

    #[tokio::test]
    async fn end_session_twice_reports_not_in_session() {
        let fx = fixture();
        let (a, b) = (ParticipantId::new(1), ParticipantId::new(2));
        pair(&fx, a, b).await;

        fx.dispatcher.end_session(a).await.unwrap();
        let err = fx.dispatcher.end_session(a).await.unwrap_err();
        assert_eq!(err, RelayError::NotInSession { id: a });
    }

    #[tokio::test]
    async fn end_session_commits_even_when_notices_fail() {
        let (a, b) = (ParticipantId::new(1), ParticipantId::new(2));
        let fx = fixture_with(RecordingDelivery::failing_for(b));
        pair(&fx, a, b).await;

        let partner = fx.dispatcher.end_session(a).await.unwrap();
        assert_eq!(partner, b);
        assert_eq!(fx.state.lock().await.sessions.partner_of(b), None);
    }
}
