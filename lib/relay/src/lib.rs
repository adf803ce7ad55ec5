//! Relay dispatching for the switchboard broker.
//!
//! This crate provides:
//!
//! - **RelayDispatcher**: in-session forwarding and session teardown
//! - **RelayNotices**: the user-facing texts it sends

pub mod dispatcher;
pub mod error;

pub use dispatcher::{RelayDispatcher, RelayNotices};
pub use error::RelayError;
