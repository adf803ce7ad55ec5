//! Participant directory for the switchboard broker.
//!
//! This crate provides:
//!
//! - **Participant**: the registered/banned directory record
//! - **Directory**: register, profile update, ban/unban operations
//! - **DirectoryStore**: the keyed-document persistence seam

pub mod directory;
pub mod error;
pub mod memory;
pub mod participant;
pub mod store;

pub use directory::Directory;
pub use error::{DirectoryError, StoreError};
pub use memory::InMemoryDirectoryStore;
pub use participant::{MediaRef, Participant, ParticipantStatus};
pub use store::DirectoryStore;
