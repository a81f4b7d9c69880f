//! Base narrator trait and common types.

use async_trait::async_trait;
use fading_core::{EventKind, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::ReportContext;

/// Result type for narrator operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Narrator error types
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid report context: {0}")]
    InvalidContext(String),
}

impl From<ReportError> for fading_core::Error {
    fn from(e: ReportError) -> Self {
        fading_core::Error::Report(e.to_string())
    }
}

/// How strongly the signal moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Significant,
    Severe,
}

impl Severity {
    /// Classify a variation magnitude in dBm.
    pub fn from_variation(dbm: i32) -> Self {
        match dbm.saturating_abs() {
            v if v > 15 => Severity::Severe,
            v if v > 8 => Severity::Significant,
            _ => Severity::Mild,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Significant => "significant",
            Severity::Severe => "severe",
        }
    }
}

/// Narrative produced for one event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub kind: EventKind,
    pub severity: Severity,
    pub headline: String,
    pub body: String,
    pub narrator: String,
    pub generated_at: Timestamp,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}\n{}", self.narrator, self.headline, self.body)
    }
}

/// Base trait for all narrators
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Narrator name/identifier
    fn name(&self) -> &str;

    /// Explain the event described by `context`
    async fn narrate(&self, context: &ReportContext) -> ReportResult<Report>;

    /// Optional: validate context before narrating
    fn validate_context(&self, context: &ReportContext) -> ReportResult<()> {
        if context.recent.is_empty() {
            Err(ReportError::InvalidContext("no samples in context".to_string()))
        } else {
            Ok(())
        }
    }
}
