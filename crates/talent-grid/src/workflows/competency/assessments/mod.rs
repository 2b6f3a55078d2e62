//! Seniority assessment lifecycle: drafting, score persistence with derived
//! totals, submission gating, calibration, and reporting exports.

pub mod domain;
pub mod export;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentId, AssessmentStatus, AssessmentType, AssessmentView, CalibrationNote, CommentSheet,
    ScoreSheet, SeniorityAssessment, TransitionError,
};
pub use export::{assessments_csv_string, write_assessments_csv, ExportError};
pub use repository::AssessmentRepository;
pub use router::assessment_router;
pub use scoring::{
    AssessmentResults, Completion, DimensionResult, GlobalResult, ScoreValidationError,
    ScoringEngine,
};
pub use service::{
    AssessmentService, AssessmentServiceError, CreateAssessmentRequest, SaveScoresRequest,
};
