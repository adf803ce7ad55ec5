//! The matching engine.
//!
//! Pops queue entries and opens sessions. The pop-then-open sequence
//! and its store write-through run inside the single pairing lock;
//! notifications go out after the lock is released and are
//! best-effort.

use crate::error::MatchError;
use crate::state::PairingState;
use crate::store::PairingStore;
use crate::ticket::WaitingTicket;
use std::sync::Arc;
use switchboard_core::ParticipantId;
use switchboard_delivery::{MediaStore, MessageDelivery, Payload};
use switchboard_directory::{Directory, MediaRef};
use tokio::sync::Mutex;

/// Fresh profile data carried on an inbound match request.
///
/// The platform adapter attaches whatever it currently knows about the
/// requester; the engine uses it for the advisory profile refresh.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Current display name, if reported.
    pub display_name: Option<String>,
    /// Current avatar bytes, if available.
    pub avatar: Option<Vec<u8>>,
}

/// What a match request accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A partner was found; both sides were notified.
    Paired { partner: ParticipantId },
    /// The queue was empty; the requester is now waiting.
    Waiting,
    /// The requester's own ticket was at the head of the queue; it was
    /// kept in place and the search continues.
    StillSearching,
}

/// User-facing notice texts sent by the matching engine.
#[derive(Debug, Clone)]
pub struct MatchNotices {
    /// Sent to both sides of a fresh pairing.
    pub partner_found: String,
    /// Sent to a requester entering the queue.
    pub waiting: String,
    /// Sent to a requester whose own ticket headed the queue.
    pub still_searching: String,
}

impl Default for MatchNotices {
    fn default() -> Self {
        Self {
            partner_found: "Partner found! Start chatting.".to_string(),
            waiting: "Waiting for a partner, please hold on...".to_string(),
            still_searching: "Still searching for a partner, please wait...".to_string(),
        }
    }
}

/// Pops queue entries and creates sessions.
pub struct MatchingEngine {
    directory: Arc<Directory>,
    state: Arc<Mutex<PairingState>>,
    store: Arc<dyn PairingStore>,
    delivery: Arc<dyn MessageDelivery>,
    media: Arc<dyn MediaStore>,
    notices: MatchNotices,
}

impl MatchingEngine {
    /// Creates a matching engine over shared pairing state.
    pub fn new(
        directory: Arc<Directory>,
        state: Arc<Mutex<PairingState>>,
        store: Arc<dyn PairingStore>,
        delivery: Arc<dyn MessageDelivery>,
        media: Arc<dyn MediaStore>,
        notices: MatchNotices,
    ) -> Self {
        Self {
            directory,
            state,
            store,
            delivery,
            media,
            notices,
        }
    }

    /// Requests a match for the participant.
    ///
    /// Pairs with the earliest waiter when one exists, otherwise
    /// enqueues the requester. The optional profile hint is applied
    /// best-effort before matching and never aborts the request.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered`, `Banned`, or `AlreadyPaired` without
    /// mutating any state.
    pub async fn request_match(
        &self,
        id: ParticipantId,
        profile: Option<ProfileUpdate>,
    ) -> Result<MatchOutcome, MatchError> {
        if self.directory.is_banned(id).await? {
            return Err(MatchError::Banned { id });
        }
        if self.directory.get(id).await?.is_none() {
            return Err(MatchError::NotRegistered { id });
        }
        if self.state.lock().await.sessions.partner_of(id).is_some() {
            return Err(MatchError::AlreadyPaired { id });
        }

        // Advisory refresh; matching proceeds whatever happens here.
        if let Some(profile) = profile {
            self.refresh_profile(id, profile).await;
        }

        let mut state = self.state.lock().await;
        // The refresh awaited outside the lock; a pairing may have
        // landed in the meantime.
        if state.sessions.partner_of(id).is_some() {
            return Err(MatchError::AlreadyPaired { id });
        }

        // One bounded re-check of the queue when the head turns out to
        // be unusable: a designed compensating action, not a loop.
        for _ in 0..2 {
            let Some(ticket) = state.queue.dequeue_oldest() else {
                break;
            };
            if ticket.participant_id == id {
                // Self-match guard: keep the requester's ticket, and
                // with it their queue position.
                state.queue.restore(ticket);
                drop(state);
                self.notify(id, &self.notices.still_searching).await;
                return Ok(MatchOutcome::StillSearching);
            }

            let candidate = ticket.participant_id;
            match state.sessions.open(id, candidate) {
                Ok(()) => {
                    // The requester may hold a ticket of their own
                    // deeper in the queue (restored at hydration);
                    // pairing consumes it together with the head's.
                    state.queue.remove(id);
                    self.persist_pairing(id, candidate).await;
                    drop(state);
                    self.notify(id, &self.notices.partner_found).await;
                    self.notify(candidate, &self.notices.partner_found).await;
                    tracing::info!(a = %id, b = %candidate, "paired participants");
                    return Ok(MatchOutcome::Paired { partner: candidate });
                }
                Err(_) => {
                    // Stale ticket: the candidate was claimed since it
                    // was queued. Drop it and re-check once.
                    if let Err(e) = self.store.delete_ticket(candidate).await {
                        tracing::warn!(participant = %candidate, error = %e, "stale ticket not deleted from store");
                    }
                }
            }
        }

        let ticket = state.queue.enqueue(id);
        self.persist_ticket(ticket).await;
        drop(state);
        self.notify(id, &self.notices.waiting).await;
        Ok(MatchOutcome::Waiting)
    }

    /// Removes the participant from the waiting queue.
    ///
    /// Idempotent and infallible: cancelling an absent ticket is a
    /// no-op. Returns true when a ticket was removed.
    pub async fn cancel_match(&self, id: ParticipantId) -> bool {
        let removed = self.state.lock().await.queue.remove(id);
        if removed {
            if let Err(e) = self.store.delete_ticket(id).await {
                tracing::warn!(participant = %id, error = %e, "ticket not deleted from store");
            }
        }
        removed
    }

    /// Applies an inbound profile hint, skipping the avatar upload
    /// when its digest matches the stored reference.
    async fn refresh_profile(&self, id: ParticipantId, profile: ProfileUpdate) {
        let media_ref = match profile.avatar {
            Some(bytes) => {
                let digest = self.media.digest(&bytes);
                let current = match self.directory.get(id).await {
                    Ok(p) => p.and_then(|p| p.media_ref().cloned()),
                    Err(e) => {
                        tracing::warn!(participant = %id, error = %e, "profile refresh skipped");
                        return;
                    }
                };
                if current.as_ref().is_some_and(|m| m.digest == digest) {
                    // Unchanged avatar, keep the stored URL.
                    current
                } else {
                    let path_hint = format!("profile_photos/{id}.jpg");
                    match self.media.upload(&bytes, &path_hint).await {
                        Ok(url) => Some(MediaRef::new(url, digest)),
                        Err(e) => {
                            tracing::warn!(participant = %id, error = %e, "avatar upload failed");
                            None
                        }
                    }
                }
            }
            None => None,
        };

        if profile.display_name.is_none() && media_ref.is_none() {
            return;
        }
        if let Err(e) = self
            .directory
            .update_profile(id, profile.display_name, media_ref)
            .await
        {
            tracing::warn!(participant = %id, error = %e, "profile refresh failed");
        }
    }

    /// Writes the outcome of a successful pairing through to the store.
    async fn persist_pairing(&self, a: ParticipantId, b: ParticipantId) {
        for result in [
            self.store.delete_ticket(a).await,
            self.store.delete_ticket(b).await,
            self.store.put_link(a, b).await,
            self.store.put_link(b, a).await,
        ] {
            if let Err(e) = result {
                tracing::warn!(a = %a, b = %b, error = %e, "pairing write-through failed");
            }
        }
    }

    async fn persist_ticket(&self, ticket: WaitingTicket) {
        if let Err(e) = self.store.put_ticket(ticket).await {
            tracing::warn!(
                participant = %ticket.participant_id,
                error = %e,
                "ticket write-through failed"
            );
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
    use crate::memory::InMemoryPairingStore;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use switchboard_delivery::{DeliveryError, DeliveryReceipt, MediaError};
    use switchboard_directory::InMemoryDirectoryStore;

    /// Records every send instead of talking to a platform.
    #[derive(Default)]
    struct RecordingDelivery {
        sent: StdMutex<Vec<(ParticipantId, Payload)>>,
    }

    impl RecordingDelivery {
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
            let kind = payload.kind();
            self.sent.lock().unwrap().push((recipient, payload));
            Ok(DeliveryReceipt::new(recipient, kind))
        }
    }

    /// Media store with a trivial length-prefixed digest.
    #[derive(Default)]
    struct FakeMediaStore {
        uploads: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl MediaStore for FakeMediaStore {
        async fn upload(&self, _bytes: &[u8], path_hint: &str) -> Result<String, MediaError> {
            self.uploads.lock().unwrap().push(path_hint.to_string());
            Ok(format!("https://media.example/{path_hint}"))
        }

        fn digest(&self, bytes: &[u8]) -> String {
            format!("len-{}", bytes.len())
        }
    }

    struct Fixture {
        directory: Arc<Directory>,
        state: Arc<Mutex<PairingState>>,
        store: Arc<InMemoryPairingStore>,
        delivery: Arc<RecordingDelivery>,
        media: Arc<FakeMediaStore>,
        engine: MatchingEngine,
    }

    fn fixture() -> Fixture {
        let directory = Arc::new(Directory::new(Arc::new(InMemoryDirectoryStore::new())));
        let state = PairingState::new().into_shared();
        let store = Arc::new(InMemoryPairingStore::new());
        let delivery = Arc::new(RecordingDelivery::default());
        let media = Arc::new(FakeMediaStore::default());
        let engine = MatchingEngine::new(
            Arc::clone(&directory),
            Arc::clone(&state),
            Arc::clone(&store) as Arc<dyn PairingStore>,
            Arc::clone(&delivery) as Arc<dyn MessageDelivery>,
            Arc::clone(&media) as Arc<dyn MediaStore>,
            MatchNotices::default(),
        );
        Fixture {
            directory,
            state,
            store,
            delivery,
            media,
            engine,
        }
    }

    async fn register(fx: &Fixture, id: i64) -> ParticipantId {
        let id = ParticipantId::new(id);
        fx.directory.register(id, format!("user{id}")).await.unwrap();
        id
    }

    #[tokio::test]
    async fn unregistered_requester_is_rejected() {
        let fx = fixture();
        let err = fx
            .engine
            .request_match(ParticipantId::new(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::NotRegistered { .. }));
    }

    #[tokio::test]
    async fn banned_requester_is_rejected() {
        let fx = fixture();
        let id = register(&fx, 1).await;
        fx.directory.ban(id).await.unwrap();

        let err = fx.engine.request_match(id, None).await.unwrap_err();
        assert!(matches!(err, MatchError::Banned { .. }));
    }

    #[tokio::test]
    async fn empty_queue_enqueues_requester() {
        let fx = fixture();
        let a = register(&fx, 1).await;

        let outcome = fx.engine.request_match(a, None).await.unwrap();

        assert_eq!(outcome, MatchOutcome::Waiting);
        let state = fx.state.lock().await;
        assert!(state.queue.contains(a));
        assert_eq!(state.sessions.partner_of(a), None);
        drop(state);
        // Ticket written through for recovery.
        assert_eq!(fx.store.list_tickets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_requester_pairs_with_first() {
        let fx = fixture();
        let a = register(&fx, 1).await;
        let b = register(&fx, 2).await;

        assert_eq!(
            fx.engine.request_match(a, None).await.unwrap(),
            MatchOutcome::Waiting
        );
        assert_eq!(
            fx.engine.request_match(b, None).await.unwrap(),
            MatchOutcome::Paired { partner: a }
        );

        let state = fx.state.lock().await;
        assert_eq!(state.sessions.partner_of(a), Some(b));
        assert_eq!(state.sessions.partner_of(b), Some(a));
        assert!(!state.queue.contains(a));
        assert!(!state.queue.contains(b));
        drop(state);

        // Both sides got the partner-found notice.
        assert_eq!(fx.delivery.sent_to(a).len(), 2); // waiting + partner found
        assert_eq!(fx.delivery.sent_to(b).len(), 1);
        // Store holds both directed links and no tickets.
        assert_eq!(fx.store.list_links().await.unwrap().len(), 2);
        assert!(fx.store.list_tickets().await.unwrap().is_empty());
    }

    /// Builds an engine over state recovered from the given store, so
    /// tests can start from a populated queue.
    async fn fixture_hydrated(store: Arc<InMemoryPairingStore>) -> Fixture {
        let directory = Arc::new(Directory::new(Arc::new(InMemoryDirectoryStore::new())));
        let state = PairingState::hydrate(store.as_ref())
            .await
            .unwrap()
            .into_shared();
        let delivery = Arc::new(RecordingDelivery::default());
        let media = Arc::new(FakeMediaStore::default());
        let engine = MatchingEngine::new(
            Arc::clone(&directory),
            Arc::clone(&state),
            Arc::clone(&store) as Arc<dyn PairingStore>,
            Arc::clone(&delivery) as Arc<dyn MessageDelivery>,
            Arc::clone(&media) as Arc<dyn MediaStore>,
            MatchNotices::default(),
        );
        Fixture {
            directory,
            state,
            store,
            delivery,
            media,
            engine,
        }
    }

    #[tokio::test]
    async fn matching_is_fifo() {
        // Two waiters can only coexist after a restart: a live matcher
        // pairs the second requester immediately. Recover them from the
        // store instead.
        let store = Arc::new(InMemoryPairingStore::new());
        let (a, b) = (ParticipantId::new(1), ParticipantId::new(2));
        store.put_ticket(WaitingTicket::new(a, 0)).await.unwrap();
        store.put_ticket(WaitingTicket::new(b, 1)).await.unwrap();

        let fx = fixture_hydrated(store).await;
        for id in [1, 2] {
            register(&fx, id).await;
        }
        let c = register(&fx, 3).await;

        // Only one slot opens; the earlier waiter gets it.
        assert_eq!(
            fx.engine.request_match(c, None).await.unwrap(),
            MatchOutcome::Paired { partner: a }
        );
        let state = fx.state.lock().await;
        assert!(state.queue.contains(b));
    }

    #[tokio::test]
    async fn pairing_consumes_requesters_own_recovered_ticket() {
        // Recovery can leave the requester queued behind the head; a
        // successful pairing must clear that ticket too, or the
        // requester ends up both waiting and paired.
        let store = Arc::new(InMemoryPairingStore::new());
        let (a, b) = (ParticipantId::new(1), ParticipantId::new(2));
        store.put_ticket(WaitingTicket::new(a, 0)).await.unwrap();
        store.put_ticket(WaitingTicket::new(b, 1)).await.unwrap();

        let fx = fixture_hydrated(store).await;
        for id in [1, 2] {
            register(&fx, id).await;
        }

        assert_eq!(
            fx.engine.request_match(b, None).await.unwrap(),
            MatchOutcome::Paired { partner: a }
        );
        let state = fx.state.lock().await;
        assert!(!state.queue.contains(b), "{b} is both waiting and paired");
        assert!(state.queue.is_empty());
        drop(state);
        assert!(fx.store.list_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn paired_requester_is_rejected() {
        let fx = fixture();
        let a = register(&fx, 1).await;
        let b = register(&fx, 2).await;
        fx.engine.request_match(a, None).await.unwrap();
        fx.engine.request_match(b, None).await.unwrap();

        let err = fx.engine.request_match(a, None).await.unwrap_err();
        assert_eq!(err, MatchError::AlreadyPaired { id: a });
    }

    #[tokio::test]
    async fn self_match_guard_keeps_ticket_and_position() {
        let fx = fixture();
        let a = register(&fx, 1).await;
        fx.engine.request_match(a, None).await.unwrap();

        // Requesting again while heading the queue must not pair or
        // drop the ticket.
        let outcome = fx.engine.request_match(a, None).await.unwrap();

        assert_eq!(outcome, MatchOutcome::StillSearching);
        let mut state = fx.state.lock().await;
        assert!(state.queue.contains(a));
        assert_eq!(state.queue.dequeue_oldest().unwrap().seq, 0);
    }

    #[tokio::test]
    async fn stale_head_triggers_one_bounded_retry() {
        let fx = fixture();
        let a = register(&fx, 1).await;
        let b = register(&fx, 2).await;
        let c = register(&fx, 3).await;

        // Stale ticket: `a` is queued but somehow already in a session.
        {
            let mut state = fx.state.lock().await;
            state.queue.enqueue(a);
            state.queue.enqueue(b);
            state.sessions.open(a, c).unwrap();
        }

        // The retry skips `a` and pairs with `b`.
        let outcome = fx
            .engine
            .request_match(register(&fx, 4).await, None)
            .await
            .unwrap();
        assert_eq!(outcome, MatchOutcome::Paired { partner: b });
    }

    #[tokio::test]
    async fn exhausted_retry_falls_back_to_waiting() {
        let fx = fixture();
        let a = register(&fx, 1).await;
        let b = register(&fx, 2).await;
        let c = register(&fx, 3).await;
        let d = register(&fx, 4).await;

        // Two stale tickets in a row.
        {
            let mut state = fx.state.lock().await;
            state.queue.enqueue(a);
            state.queue.enqueue(b);
            state.sessions.open(a, c).unwrap();
            state.sessions.open(b, d).unwrap();
        }

        let e = register(&fx, 5).await;
        assert_eq!(
            fx.engine.request_match(e, None).await.unwrap(),
            MatchOutcome::Waiting
        );
        let state = fx.state.lock().await;
        assert!(state.queue.contains(e));
    }

    #[tokio::test]
    async fn cancel_match_is_idempotent() {
        let fx = fixture();
        let a = register(&fx, 1).await;
        fx.engine.request_match(a, None).await.unwrap();

        assert!(fx.engine.cancel_match(a).await);
        assert!(!fx.engine.cancel_match(a).await);
        assert!(fx.store.list_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn waiting_and_paired_are_mutually_exclusive() {
        let fx = fixture();
        let a = register(&fx, 1).await;
        let b = register(&fx, 2).await;
        fx.engine.request_match(a, None).await.unwrap();
        fx.engine.request_match(b, None).await.unwrap();

        let state = fx.state.lock().await;
        for id in [a, b] {
            let queued = state.queue.contains(id);
            let paired = state.sessions.partner_of(id).is_some();
            assert!(!(queued && paired), "{id} is both waiting and paired");
        }
    }

    #[tokio::test]
    async fn profile_refresh_uploads_changed_avatar_only() {
        let fx = fixture();
        let a = register(&fx, 1).await;
        let profile = ProfileUpdate {
            display_name: Some("fresh name".to_string()),
            avatar: Some(vec![1, 2, 3]),
        };

        fx.engine.request_match(a, Some(profile.clone())).await.unwrap();
        let p = fx.directory.get(a).await.unwrap().unwrap();
        assert_eq!(p.display_name(), "fresh name");
        assert_eq!(p.media_ref().map(|m| m.digest.as_str()), Some("len-3"));
        assert_eq!(fx.media.uploads.lock().unwrap().len(), 1);

        // Same bytes again: digest matches, no second upload.
        fx.engine.cancel_match(a).await;
        fx.engine.request_match(a, Some(profile)).await.unwrap();
        assert_eq!(fx.media.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profile_refresh_failure_does_not_abort_matching() {
        struct FailingMedia;

        #[async_trait]
        impl MediaStore for FailingMedia {
            async fn upload(&self, _: &[u8], path_hint: &str) -> Result<String, MediaError> {
                Err(MediaError::UploadFailed {
                    path_hint: path_hint.to_string(),
                    reason: "storage down".to_string(),
                })
            }

            fn digest(&self, bytes: &[u8]) -> String {
                format!("len-{}", bytes.len())
            }
        }

        let directory = Arc::new(Directory::new(Arc::new(InMemoryDirectoryStore::new())));
        let engine = MatchingEngine::new(
            Arc::clone(&directory),
            PairingState::new().into_shared(),
            Arc::new(InMemoryPairingStore::new()),
            Arc::new(RecordingDelivery::default()),
            Arc::new(FailingMedia),
            MatchNotices::default(),
        );
        let a = ParticipantId::new(1);
        directory.register(a, "alice").await.unwrap();

        let profile = ProfileUpdate {
            display_name: None,
            avatar: Some(vec![9]),
        };
        assert_eq!(
            engine.request_match(a, Some(profile)).await.unwrap(),
            MatchOutcome::Waiting
        );
    }
}
