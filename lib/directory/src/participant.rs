//! Participant domain type and related structures.
//!
//! A Participant is an identity the broker recognizes. The id is
//! assigned by the chat platform and immutable; everything else may be
//! refreshed as the platform reports newer profile data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchboard_core::ParticipantId;

/// Participation eligibility of a directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    /// May queue, pair, and relay.
    Registered,
    /// Excluded from all participation until unbanned.
    Banned,
}

/// Reference to an externally stored profile asset.
///
/// The digest is the media store's content digest for the uploaded
/// bytes; it lets the profile-refresh path skip re-uploading an
/// unchanged avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Public URL of the stored asset.
    pub url: String,
    /// Content digest of the uploaded bytes.
    pub digest: String,
}

impl MediaRef {
    /// Creates a media reference.
    #[must_use]
    pub fn new(url: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            digest: digest.into(),
        }
    }
}

/// A registered (or banned) participant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Platform-assigned identity. Immutable.
    id: ParticipantId,
    /// Last display name reported by the platform.
    display_name: String,
    /// Reference to the externally stored profile asset, if any.
    media_ref: Option<MediaRef>,
    /// Current eligibility.
    status: ParticipantStatus,
    /// When the record was first created.
    registered_at: DateTime<Utc>,
    /// When the record was last updated.
    updated_at: DateTime<Utc>,
}

impl Participant {
    /// Creates a fresh Registered record with no media reference.
    #[must_use]
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name: display_name.into(),
            media_ref: None,
            status: ParticipantStatus::Registered,
            registered_at: now,
            updated_at: now,
        }
    }

    /// Returns the platform-assigned identity.
    #[must_use]
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Returns the current display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the profile media reference, if any.
    #[must_use]
    pub fn media_ref(&self) -> Option<&MediaRef> {
        self.media_ref.as_ref()
    }

    /// Returns the current eligibility status.
    #[must_use]
    pub fn status(&self) -> ParticipantStatus {
        self.status
    }

    /// Returns when the record was created.
    #[must_use]
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns when the record was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Refreshes the display name.
    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
        self.updated_at = Utc::now();
    }

    /// Replaces the profile media reference.
    pub fn set_media_ref(&mut self, media_ref: Option<MediaRef>) {
        self.media_ref = media_ref;
        self.updated_at = Utc::now();
    }

    /// Marks the record banned. The snapshot of the remaining
    /// attributes is preserved for a later unban.
    pub fn mark_banned(&mut self) {
        self.status = ParticipantStatus::Banned;
        self.updated_at = Utc::now();
    }

    /// Restores the record to Registered.
    pub fn mark_registered(&mut self) {
        self.status = ParticipantStatus::Registered;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_participant_is_registered_without_media() {
        let p = Participant::new(ParticipantId::new(1), "alice");
        assert_eq!(p.status(), ParticipantStatus::Registered);
        assert!(p.media_ref().is_none());
        assert_eq!(p.display_name(), "alice");
    }

    #[test]
    fn ban_and_restore_preserve_attributes() {
        let mut p = Participant::new(ParticipantId::new(2), "bob");
        p.set_media_ref(Some(MediaRef::new("https://example/b.jpg", "d1")));

        p.mark_banned();
        assert_eq!(p.status(), ParticipantStatus::Banned);

        p.mark_registered();
        assert_eq!(p.status(), ParticipantStatus::Registered);
        assert_eq!(p.display_name(), "bob");
        assert_eq!(p.media_ref().map(|m| m.digest.as_str()), Some("d1"));
    }

    #[test]
    fn participant_serde_roundtrip() {
        let p = Participant::new(ParticipantId::new(3), "carol");
        let json = serde_json::to_string(&p).expect("serialize");
        let parsed: Participant = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(p, parsed);
    }
}
