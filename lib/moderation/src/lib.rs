//! Moderation for the session broker: administrator-gated bans and
//! unbans that cascade through pairing state, plus an append-only
//! participant report log.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::{BanOutcome, ModerationEngine, ModerationNotices};
pub use error::ModerationError;
pub use report::{InMemoryReportStore, ReportRecord, ReportStore, ReportStoreError};
