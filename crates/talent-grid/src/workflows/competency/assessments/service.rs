use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use super::super::access::{require_administrator, require_calibrator, AccessError, Actor};
use super::super::audit::{snapshot, AuditAction, AuditEntry, AuditError, AuditLogWriter};
use super::super::frameworks::domain::{FrameworkId, JobTitleId, UserId, WorkspaceId};
use super::super::frameworks::repository::FrameworkRepository;
use super::domain::{
    AssessmentId, AssessmentStatus, AssessmentType, CalibrationNote, CommentSheet, ScoreSheet,
    SeniorityAssessment, TransitionError,
};
use super::repository::{AssessmentRepository, RepositoryError};
use super::scoring::{ScoreValidationError, ScoringEngine};

/// Payload creating a draft assessment. The active framework for the job
/// title is locked in by reference at this point.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssessmentRequest {
    pub workspace_id: WorkspaceId,
    pub evaluated_user: UserId,
    #[serde(default)]
    pub evaluator: Option<UserId>,
    pub job_title_id: JobTitleId,
    pub assessment_type: AssessmentType,
    pub period: String,
}

/// Full-sheet save payload. Auto-save and manual save both send the entire
/// local sheet; the service re-derives totals before persisting either one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveScoresRequest {
    #[serde(default)]
    pub scores: ScoreSheet,
    #[serde(default)]
    pub comments: CommentSheet,
}

/// Service owning the assessment lifecycle: drafting, score persistence,
/// submission, calibration, and cancellation.
pub struct AssessmentService<F, A, L> {
    frameworks: Arc<F>,
    assessments: Arc<A>,
    audit: Arc<L>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asmt-{id:06}"))
}

impl<F, A, L> AssessmentService<F, A, L>
where
    F: FrameworkRepository + 'static,
    A: AssessmentRepository + 'static,
    L: AuditLogWriter + 'static,
{
    pub fn new(frameworks: Arc<F>, assessments: Arc<A>, audit: Arc<L>) -> Self {
        Self {
            frameworks,
            assessments,
            audit,
        }
    }

    /// Open a draft against the job title's active framework.
    pub fn create(
        &self,
        actor: &Actor,
        request: CreateAssessmentRequest,
    ) -> Result<SeniorityAssessment, AssessmentServiceError> {
        match (request.assessment_type, request.evaluator.as_ref()) {
            (AssessmentType::SelfReview, Some(_)) => {
                return Err(AssessmentServiceError::EvaluatorForbidden)
            }
            (AssessmentType::Leader, None) => {
                return Err(AssessmentServiceError::EvaluatorRequired)
            }
            _ => {}
        }
        self.require_participant(
            actor,
            request.assessment_type,
            &request.evaluated_user,
            request.evaluator.as_ref(),
            true,
        )?;

        let framework = self
            .frameworks
            .active_template(&request.job_title_id)?
            .ok_or_else(|| AssessmentServiceError::NoActiveFramework {
                job_title: request.job_title_id.clone(),
            })?;

        let engine = ScoringEngine::new(&framework);
        let scores = ScoreSheet::default();
        let results = engine.results(&scores);
        let now = Utc::now();

        let assessment = SeniorityAssessment {
            id: next_assessment_id(),
            workspace_id: request.workspace_id,
            evaluated_user: request.evaluated_user,
            evaluator: request.evaluator,
            job_title_id: request.job_title_id,
            framework_id: framework.id.clone(),
            assessment_type: request.assessment_type,
            status: AssessmentStatus::Draft,
            scores,
            comments: CommentSheet::default(),
            results,
            period: request.period,
            calibration_notes: Vec::new(),
            created_at: now,
            updated_at: now,
            submitted_at: None,
            calibrated_at: None,
        };

        let stored = self.assessments.insert(assessment)?;
        self.audit.record(AuditEntry::new(
            AuditAction::AssessmentCreated,
            actor.user_id.clone(),
            None,
            Some(snapshot(&stored)?),
        ))?;
        Ok(stored)
    }

    /// Persist the raw sheet and comments, re-deriving totals and levels.
    /// Draft only; submission freezes the sheet.
    pub fn save_scores(
        &self,
        actor: &Actor,
        id: &AssessmentId,
        request: SaveScoresRequest,
    ) -> Result<SeniorityAssessment, AssessmentServiceError> {
        let mut assessment = self
            .assessments
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        self.require_participant(
            actor,
            assessment.assessment_type,
            &assessment.evaluated_user,
            assessment.evaluator.as_ref(),
            true,
        )?;

        if !assessment.status.allows_score_mutation() {
            return Err(AssessmentServiceError::ScoresLocked {
                status: assessment.status,
            });
        }

        let framework = self.load_framework(&assessment.framework_id)?;
        let engine = ScoringEngine::new(&framework);
        engine.validate_sheet(&request.scores)?;

        let before = snapshot(&assessment)?;
        assessment.scores = request.scores;
        assessment.comments = request.comments;
        assessment.results = engine.results(&assessment.scores);
        assessment.updated_at = Utc::now();

        self.assessments.update(assessment.clone())?;
        self.audit.record(AuditEntry::new(
            AuditAction::AssessmentScoresSaved,
            actor.user_id.clone(),
            Some(before),
            Some(snapshot(&assessment)?),
        ))?;
        Ok(assessment)
    }

    /// Submit a completed draft. Self assessments are submitted by the
    /// evaluated person, leader assessments by the recorded evaluator.
    pub fn submit(
        &self,
        actor: &Actor,
        id: &AssessmentId,
    ) -> Result<SeniorityAssessment, AssessmentServiceError> {
        let mut assessment = self
            .assessments
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        self.require_participant(
            actor,
            assessment.assessment_type,
            &assessment.evaluated_user,
            assessment.evaluator.as_ref(),
            false,
        )?;

        let target = assessment.assessment_type.submitted_status();
        if !assessment.status.can_transition(target) {
            return Err(TransitionError {
                from: assessment.status,
                to: target,
            }
            .into());
        }

        let framework = self.load_framework(&assessment.framework_id)?;
        let completion = ScoringEngine::new(&framework).completion(&assessment.scores);
        if !completion.is_complete() {
            return Err(AssessmentServiceError::Incomplete {
                scored: completion.scored,
                expected: completion.expected,
            });
        }

        let before = snapshot(&assessment)?;
        let now = Utc::now();
        assessment.status = target;
        assessment.submitted_at = Some(now);
        assessment.updated_at = now;

        self.assessments.update(assessment.clone())?;
        self.audit.record(AuditEntry::new(
            AuditAction::AssessmentSubmitted,
            actor.user_id.clone(),
            Some(before),
            Some(snapshot(&assessment)?),
        ))?;
        Ok(assessment)
    }

    /// Leader/admin confirmation step after submission; appends a note and
    /// stamps `calibrated_at`.
    pub fn calibrate(
        &self,
        actor: &Actor,
        id: &AssessmentId,
        note: String,
    ) -> Result<SeniorityAssessment, AssessmentServiceError> {
        require_calibrator(actor)?;
        let mut assessment = self
            .assessments
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if !assessment
            .status
            .can_transition(AssessmentStatus::Calibrated)
        {
            return Err(TransitionError {
                from: assessment.status,
                to: AssessmentStatus::Calibrated,
            }
            .into());
        }

        let before = snapshot(&assessment)?;
        let now = Utc::now();
        assessment.status = AssessmentStatus::Calibrated;
        assessment.calibration_notes.push(CalibrationNote {
            author: actor.user_id.clone(),
            note,
            recorded_at: now,
        });
        assessment.calibrated_at = Some(now);
        assessment.updated_at = now;

        self.assessments.update(assessment.clone())?;
        self.audit.record(AuditEntry::new(
            AuditAction::AssessmentCalibrated,
            actor.user_id.clone(),
            Some(before),
            Some(snapshot(&assessment)?),
        ))?;
        Ok(assessment)
    }

    /// Administrative override terminating any non-terminal assessment.
    pub fn cancel(
        &self,
        actor: &Actor,
        id: &AssessmentId,
    ) -> Result<SeniorityAssessment, AssessmentServiceError> {
        require_administrator(actor)?;
        let mut assessment = self
            .assessments
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if !assessment
            .status
            .can_transition(AssessmentStatus::Cancelled)
        {
            return Err(TransitionError {
                from: assessment.status,
                to: AssessmentStatus::Cancelled,
            }
            .into());
        }

        let before = snapshot(&assessment)?;
        assessment.status = AssessmentStatus::Cancelled;
        assessment.updated_at = Utc::now();

        self.assessments.update(assessment.clone())?;
        self.audit.record(AuditEntry::new(
            AuditAction::AssessmentCancelled,
            actor.user_id.clone(),
            Some(before),
            Some(snapshot(&assessment)?),
        ))?;
        Ok(assessment)
    }

    pub fn get(&self, id: &AssessmentId) -> Result<SeniorityAssessment, AssessmentServiceError> {
        self.assessments
            .fetch(id)?
            .ok_or(AssessmentServiceError::Repository(RepositoryError::NotFound))
    }

    pub fn for_workspace(
        &self,
        workspace: &WorkspaceId,
    ) -> Result<Vec<SeniorityAssessment>, AssessmentServiceError> {
        Ok(self.assessments.for_workspace(workspace)?)
    }

    fn load_framework(
        &self,
        id: &FrameworkId,
    ) -> Result<super::super::frameworks::domain::CompetencyFramework, AssessmentServiceError> {
        self.frameworks
            .fetch(id)?
            .ok_or_else(|| AssessmentServiceError::FrameworkMissing { id: id.clone() })
    }

    /// Participant check shared by the mutation paths. Self assessments
    /// belong to the evaluated person, leader assessments to the evaluator;
    /// `admin_override` additionally admits workspace admins and system
    /// owners (drafting on someone's behalf), while submission stays strict.
    fn require_participant(
        &self,
        actor: &Actor,
        assessment_type: AssessmentType,
        evaluated_user: &UserId,
        evaluator: Option<&UserId>,
        admin_override: bool,
    ) -> Result<(), AccessError> {
        let participant = match assessment_type {
            AssessmentType::SelfReview => actor.user_id == *evaluated_user,
            AssessmentType::Leader => evaluator.is_some_and(|user| actor.user_id == *user),
        };

        if participant || (admin_override && actor.can_administer()) {
            Ok(())
        } else {
            Err(AccessError)
        }
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Scores(#[from] ScoreValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("no framework configured for this job title")]
    NoActiveFramework { job_title: JobTitleId },
    #[error("framework '{id}' referenced by this assessment no longer exists")]
    FrameworkMissing { id: FrameworkId },
    #[error("scores can only change while the assessment is in draft (currently {})", .status.label())]
    ScoresLocked { status: AssessmentStatus },
    #[error("assessment incomplete: {scored} of {expected} competencies scored")]
    Incomplete { scored: usize, expected: usize },
    #[error("leader assessments require an evaluator")]
    EvaluatorRequired,
    #[error("self assessments must not carry an evaluator")]
    EvaluatorForbidden,
}
