//! Participant reports.
//!
//! Reports are append-only: written once when filed, never mutated.
//! No moderation workflow is attached here; administrators read the
//! log out of band.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use switchboard_core::{ParticipantId, ReportId};

/// A filed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Unique report identifier.
    pub id: ReportId,
    /// Who filed the report.
    pub reporter_id: ParticipantId,
    /// Who the report is about, when known (the reporter's current
    /// partner is captured automatically when they are in a session).
    pub reported_id: Option<ParticipantId>,
    /// Free-form report text.
    pub text: String,
    /// When the report was filed.
    pub reported_at: DateTime<Utc>,
}

impl ReportRecord {
    /// Creates a report filed now.
    #[must_use]
    pub fn new(
        reporter_id: ParticipantId,
        reported_id: Option<ParticipantId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: ReportId::new(),
            reporter_id,
            reported_id,
            text: text.into(),
            reported_at: Utc::now(),
        }
    }
}

/// Errors from the report log backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStoreError {
    /// The append was rejected or lost.
    AppendFailed { reason: String },
    /// The log could not be read.
    ReadFailed { reason: String },
}

impl std::fmt::Display for ReportStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AppendFailed { reason } => write!(f, "report append failed: {reason}"),
            Self::ReadFailed { reason } => write!(f, "report log read failed: {reason}"),
        }
    }
}

impl std::error::Error for ReportStoreError {}

/// Trait for persisting the append-only report log.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Appends a report. Never mutates existing records.
    async fn append(&self, record: ReportRecord) -> Result<(), ReportStoreError>;

    /// Returns all reports in filing order.
    async fn list(&self) -> Result<Vec<ReportRecord>, ReportStoreError>;
}

/// A `ReportStore` holding the log in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportStore {
    records: Arc<RwLock<Vec<ReportRecord>>>,
}

impl InMemoryReportStore {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn append(&self, record: ReportRecord) -> Result<(), ReportStoreError> {
        self.records.write().unwrap().push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ReportRecord>, ReportStoreError> {
        Ok(self.records.read().unwrap().clone())
    }
}
