//! In-memory directory store.
//!
//! Suitable for tests and single-process deployments; a production
//! deployment supplies a store backed by the external document service.

use crate::error::StoreError;
use crate::participant::Participant;
use crate::store::DirectoryStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use switchboard_core::ParticipantId;

/// A `DirectoryStore` holding both collections in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectoryStore {
    registered: Arc<RwLock<HashMap<ParticipantId, Participant>>>,
    banned: Arc<RwLock<HashMap<ParticipantId, Participant>>>,
}

impl InMemoryDirectoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn put_registered(&self, participant: Participant) -> Result<(), StoreError> {
        self.registered
            .write()
            .unwrap()
            .insert(participant.id(), participant);
        Ok(())
    }

    async fn get_registered(&self, id: ParticipantId) -> Result<Option<Participant>, StoreError> {
        Ok(self.registered.read().unwrap().get(&id).cloned())
    }

    async fn delete_registered(&self, id: ParticipantId) -> Result<(), StoreError> {
        self.registered.write().unwrap().remove(&id);
        Ok(())
    }

    async fn list_registered(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.registered.read().unwrap().values().cloned().collect())
    }

    async fn put_banned(&self, participant: Participant) -> Result<(), StoreError> {
        self.banned
            .write()
            .unwrap()
            .insert(participant.id(), participant);
        Ok(())
    }

    async fn get_banned(&self, id: ParticipantId) -> Result<Option<Participant>, StoreError> {
        Ok(self.banned.read().unwrap().get(&id).cloned())
    }

    async fn delete_banned(&self, id: ParticipantId) -> Result<(), StoreError> {
        self.banned.write().unwrap().remove(&id);
        Ok(())
    }

    async fn list_banned(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.banned.read().unwrap().values().cloned().collect())
    }
}
