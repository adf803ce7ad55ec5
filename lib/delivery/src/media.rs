//! Media store collaborator seam.
//!
//! Profile avatars are persisted in an external object store. The
//! digest hook lets the profile-refresh path detect an unchanged
//! avatar and skip the re-upload.

use crate::error::MediaError;
use async_trait::async_trait;

/// Trait for persisting media assets externally.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads raw bytes, returning the public URL of the stored asset.
    ///
    /// `path_hint` suggests a storage path (e.g. `profile_photos/42.jpg`);
    /// the store may rewrite it.
    async fn upload(&self, bytes: &[u8], path_hint: &str) -> Result<String, MediaError>;

    /// Returns a stable content digest for the given bytes.
    ///
    /// Two byte strings with equal digests are treated as the same
    /// asset; the algorithm is the store's choice as long as it is
    /// stable across calls.
    fn digest(&self, bytes: &[u8]) -> String;
}
