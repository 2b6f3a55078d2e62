use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::frameworks::domain::UserId;

/// Mutating operations recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    FrameworkCreated,
    FrameworkVersioned,
    FrameworkDuplicated,
    FrameworkDeleted,
    AssessmentCreated,
    AssessmentScoresSaved,
    AssessmentSubmitted,
    AssessmentCalibrated,
    AssessmentCancelled,
}

impl AuditAction {
    pub const fn label(self) -> &'static str {
        match self {
            AuditAction::FrameworkCreated => "framework_created",
            AuditAction::FrameworkVersioned => "framework_versioned",
            AuditAction::FrameworkDuplicated => "framework_duplicated",
            AuditAction::FrameworkDeleted => "framework_deleted",
            AuditAction::AssessmentCreated => "assessment_created",
            AuditAction::AssessmentScoresSaved => "assessment_scores_saved",
            AuditAction::AssessmentSubmitted => "assessment_submitted",
            AuditAction::AssessmentCalibrated => "assessment_calibrated",
            AuditAction::AssessmentCancelled => "assessment_cancelled",
        }
    }
}

/// Before/after snapshot written after every mutating service call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub actor: UserId,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        actor: UserId,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            action,
            actor,
            before,
            after,
            recorded_at: Utc::now(),
        }
    }
}

/// Serialize a domain record into an audit snapshot.
pub fn snapshot<T: Serialize>(value: &T) -> Result<serde_json::Value, AuditError> {
    serde_json::to_value(value).map_err(|err| AuditError::Snapshot(err.to_string()))
}

/// Trait describing the outbound audit-log collaborator.
pub trait AuditLogWriter: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

/// Audit dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit snapshot failed: {0}")]
    Snapshot(String),
    #[error("audit transport unavailable: {0}")]
    Transport(String),
}
