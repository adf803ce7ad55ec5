//! Pairing state and matching for the switchboard broker.
//!
//! This crate provides:
//!
//! - **WaitingQueue**: FIFO tickets for participants seeking a partner
//! - **SessionTable**: active sessions as symmetric directed links
//! - **PairingState**: both containers under one critical section
//! - **MatchingEngine**: the pop-then-open pairing algorithm

pub mod engine;
pub mod error;
pub mod memory;
pub mod queue;
pub mod session;
pub mod state;
pub mod store;
pub mod ticket;

pub use engine::{MatchNotices, MatchOutcome, MatchingEngine, ProfileUpdate};
pub use error::{MatchError, SessionError, StoreError};
pub use memory::InMemoryPairingStore;
pub use queue::WaitingQueue;
pub use session::SessionTable;
pub use state::PairingState;
pub use store::PairingStore;
pub use ticket::WaitingTicket;
