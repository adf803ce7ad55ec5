//! The switchboard broker facade.
//!
//! This crate provides:
//!
//! - **Broker**: the single entry point composing directory, matching,
//!   relay, and moderation
//! - **BrokerConfig**: environment-driven configuration
//! - **BrokerError**: the facade-level error sum

pub mod broker;
pub mod config;
pub mod error;

pub use broker::{BroadcastReport, Broker};
pub use config::{BrokerConfig, NoticeConfig};
pub use error::BrokerError;
