//! The participant directory engine.
//!
//! Tracks registered and banned participants on top of the external
//! keyed-document store. Mutations are serialized behind a single
//! async mutex and written store-first: a storage failure surfaces as
//! an error and never leaves a half-applied transition. Reads go to
//! the store without the lock and tolerate staleness.
//!
//! The directory does not cascade: banning here does not touch queue
//! or session state, the moderation engine owns that purge.

use crate::error::DirectoryError;
use crate::participant::{MediaRef, Participant};
use crate::store::DirectoryStore;
use std::sync::Arc;
use switchboard_core::ParticipantId;
use tokio::sync::Mutex;

/// The participant directory.
pub struct Directory {
    store: Arc<dyn DirectoryStore>,
    /// Serializes mutating operations; reads bypass it.
    write_lock: Mutex<()>,
}

impl Directory {
    /// Creates a directory over the given store.
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Registers a participant, or refreshes the display name of an
    /// existing registration.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyBanned` if the id is in the banned set; the
    /// rejection has no side effects.
    pub async fn register(
        &self,
        id: ParticipantId,
        display_name: impl Into<String> + Send,
    ) -> Result<Participant, DirectoryError> {
        let _guard = self.write_lock.lock().await;

        if self.store.get_banned(id).await?.is_some() {
            return Err(DirectoryError::AlreadyBanned { id });
        }

        let participant = match self.store.get_registered(id).await? {
            Some(mut existing) => {
                existing.set_display_name(display_name);
                existing
            }
            None => Participant::new(id, display_name),
        };
        self.store.put_registered(participant.clone()).await?;
        tracing::info!(participant = %id, "registered participant");
        Ok(participant)
    }

    /// Updates the profile of a registered participant.
    ///
    /// `display_name` and `media_ref` are applied only when present.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if the id has no registered record.
    pub async fn update_profile(
        &self,
        id: ParticipantId,
        display_name: Option<String>,
        media_ref: Option<MediaRef>,
    ) -> Result<Participant, DirectoryError> {
        let _guard = self.write_lock.lock().await;

        let mut participant = self
            .store
            .get_registered(id)
            .await?
            .ok_or(DirectoryError::NotRegistered { id })?;

        if let Some(name) = display_name {
            participant.set_display_name(name);
        }
        if media_ref.is_some() {
            participant.set_media_ref(media_ref);
        }
        self.store.put_registered(participant.clone()).await?;
        Ok(participant)
    }

    /// Moves a registered participant to the banned set, snapshotting
    /// its current attributes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id has no registered record.
    pub async fn ban(&self, id: ParticipantId) -> Result<Participant, DirectoryError> {
        let _guard = self.write_lock.lock().await;

        let mut participant = self
            .store
            .get_registered(id)
            .await?
            .ok_or(DirectoryError::NotFound { id })?;
        participant.mark_banned();

        // Banned-set write first: if the registered delete is lost, the
        // banned record still wins every eligibility check.
        self.store.put_banned(participant.clone()).await?;
        self.store.delete_registered(id).await?;
        tracing::info!(participant = %id, "banned participant");
        Ok(participant)
    }

    /// Restores a banned participant to the registered set.
    ///
    /// # Errors
    ///
    /// Returns `NotBanned` if the id is absent from the banned set.
    pub async fn unban(&self, id: ParticipantId) -> Result<Participant, DirectoryError> {
        let _guard = self.write_lock.lock().await;

        let mut participant = self
            .store
            .get_banned(id)
            .await?
            .ok_or(DirectoryError::NotBanned { id })?;
        participant.mark_registered();

        self.store.put_registered(participant.clone()).await?;
        self.store.delete_banned(id).await?;
        tracing::info!(participant = %id, "unbanned participant");
        Ok(participant)
    }

    /// Returns true if the id is in the banned set.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the banned collection cannot be read.
    pub async fn is_banned(&self, id: ParticipantId) -> Result<bool, DirectoryError> {
        Ok(self.store.get_banned(id).await?.is_some())
    }

    /// Returns the registered record for the id, if any.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the registered collection cannot be read.
    pub async fn get(&self, id: ParticipantId) -> Result<Option<Participant>, DirectoryError> {
        Ok(self.store.get_registered(id).await?)
    }

    /// Lists all registered participants. Order not significant.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the registered collection cannot be read.
    pub async fn list_registered(&self) -> Result<Vec<Participant>, DirectoryError> {
        Ok(self.store.list_registered().await?)
    }

    /// Lists all banned participants. Order not significant.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the banned collection cannot be read.
    pub async fn list_banned(&self) -> Result<Vec<Participant>, DirectoryError> {
        Ok(self.store.list_banned().await?)
    }
}
