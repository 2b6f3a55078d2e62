use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::frameworks::domain::{
    CompetencyId, Dimension, FrameworkId, JobTitleId, UserId, WorkspaceId,
};
use super::scoring::AssessmentResults;

/// Identifier wrapper for assessment rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who scores the assessment: the evaluated person or their leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentType {
    #[serde(rename = "self")]
    SelfReview,
    #[serde(rename = "leader")]
    Leader,
}

impl AssessmentType {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentType::SelfReview => "self",
            AssessmentType::Leader => "leader",
        }
    }

    /// Status an assessment of this type transitions into on submission.
    pub const fn submitted_status(self) -> AssessmentStatus {
        match self {
            AssessmentType::SelfReview => AssessmentStatus::SelfSubmitted,
            AssessmentType::Leader => AssessmentStatus::LeaderSubmitted,
        }
    }
}

/// Lifecycle states of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    SelfSubmitted,
    LeaderSubmitted,
    Calibrated,
    Cancelled,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::SelfSubmitted => "self_submitted",
            AssessmentStatus::LeaderSubmitted => "leader_submitted",
            AssessmentStatus::Calibrated => "calibrated",
            AssessmentStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, AssessmentStatus::Calibrated | AssessmentStatus::Cancelled)
    }

    /// Raw scores and comments may only change while drafting.
    pub const fn allows_score_mutation(self) -> bool {
        matches!(self, AssessmentStatus::Draft)
    }

    /// Legal state-machine edges. Cancellation is reachable from any
    /// non-terminal state; everything else follows the submission chain.
    pub fn can_transition(self, to: AssessmentStatus) -> bool {
        match (self, to) {
            (AssessmentStatus::Draft, AssessmentStatus::SelfSubmitted)
            | (AssessmentStatus::Draft, AssessmentStatus::LeaderSubmitted)
            | (AssessmentStatus::SelfSubmitted, AssessmentStatus::Calibrated)
            | (AssessmentStatus::LeaderSubmitted, AssessmentStatus::Calibrated) => true,
            (from, AssessmentStatus::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Rejected state-machine edge.
#[derive(Debug, thiserror::Error)]
#[error("cannot transition assessment from {} to {}", .from.label(), .to.label())]
pub struct TransitionError {
    pub from: AssessmentStatus,
    pub to: AssessmentStatus,
}

/// Raw per-competency scores per dimension. Values are 0-3 where 0 marks a
/// competency the evaluator has not scored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    #[serde(default)]
    pub behavioral: BTreeMap<CompetencyId, u8>,
    #[serde(default)]
    pub technical: BTreeMap<CompetencyId, u8>,
    #[serde(default)]
    pub process: BTreeMap<CompetencyId, u8>,
}

impl ScoreSheet {
    pub fn for_dimension(&self, dimension: Dimension) -> &BTreeMap<CompetencyId, u8> {
        match dimension {
            Dimension::Behavioral => &self.behavioral,
            Dimension::Technical => &self.technical,
            Dimension::Process => &self.process,
        }
    }

    pub fn for_dimension_mut(&mut self, dimension: Dimension) -> &mut BTreeMap<CompetencyId, u8> {
        match dimension {
            Dimension::Behavioral => &mut self.behavioral,
            Dimension::Technical => &mut self.technical,
            Dimension::Process => &mut self.process,
        }
    }

    /// Competencies carrying a non-zero score across all dimensions.
    pub fn recorded_count(&self) -> usize {
        Dimension::ALL
            .iter()
            .map(|dimension| {
                self.for_dimension(*dimension)
                    .values()
                    .filter(|value| **value > 0)
                    .count()
            })
            .sum()
    }
}

/// Free-text evaluator comment per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSheet {
    #[serde(default)]
    pub behavioral: Option<String>,
    #[serde(default)]
    pub technical: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
}

/// A note appended during the calibration step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationNote {
    pub author: UserId,
    pub note: String,
    pub recorded_at: DateTime<Utc>,
}

/// One evaluation of a person against a framework version.
///
/// The framework is referenced, not copied; historical reads depend on the
/// referenced row surviving, which is why framework deletion is guarded by a
/// reference check. Totals and levels are derived state, recomputed from the
/// raw sheet on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeniorityAssessment {
    pub id: AssessmentId,
    pub workspace_id: WorkspaceId,
    pub evaluated_user: UserId,
    /// `None` marks a self-assessment.
    pub evaluator: Option<UserId>,
    pub job_title_id: JobTitleId,
    pub framework_id: FrameworkId,
    pub assessment_type: AssessmentType,
    pub status: AssessmentStatus,
    pub scores: ScoreSheet,
    pub comments: CommentSheet,
    pub results: AssessmentResults,
    /// Free-form period tag, e.g. "2026-Q3".
    pub period: String,
    pub calibration_notes: Vec<CalibrationNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub calibrated_at: Option<DateTime<Utc>>,
}

impl SeniorityAssessment {
    pub fn is_self_assessment(&self) -> bool {
        self.evaluator.is_none()
    }

    pub fn status_view(&self) -> AssessmentView {
        AssessmentView {
            id: self.id.clone(),
            workspace_id: self.workspace_id.clone(),
            evaluated_user: self.evaluated_user.clone(),
            assessment_type: self.assessment_type.label(),
            status: self.status.label(),
            period: self.period.clone(),
            global_score: self.results.global.score,
            global_level: self.results.global.level.label(),
            scored: self.scores.recorded_count(),
            expected: self.results.expected_count(),
        }
    }
}

/// Sanitized representation of an assessment for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub id: AssessmentId,
    pub workspace_id: WorkspaceId,
    pub evaluated_user: UserId,
    pub assessment_type: &'static str,
    pub status: &'static str,
    pub period: String,
    pub global_score: f64,
    pub global_level: &'static str,
    pub scored: usize,
    pub expected: usize,
}
