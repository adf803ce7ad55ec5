//! Core domain types for the switchboard broker.
//!
//! This crate provides the foundational ID types shared by the
//! directory, pairing, moderation, and relay crates.

pub mod id;

pub use id::{ParseIdError, ParticipantId, ReceiptId, ReportId};
