//! Delivery collaborator seams for the switchboard broker.
//!
//! This crate provides:
//!
//! - **Payload**: the closed variant type for relayed content
//! - **MessageDelivery**: the send-to-participant seam
//! - **MediaStore**: the external asset persistence seam

pub mod delivery;
pub mod error;
pub mod media;
pub mod payload;

pub use delivery::{DeliveryReceipt, MessageDelivery};
pub use error::{DeliveryError, MediaError};
pub use media::MediaStore;
pub use payload::{Payload, PayloadKind};
