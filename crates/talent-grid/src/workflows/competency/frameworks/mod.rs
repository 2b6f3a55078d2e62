//! Competency-framework administration: immutable version history with a
//! single active global template per job title.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    CompetencyDefinition, CompetencyFramework, CompetencyId, CompetencyMatrix, Dimension,
    DimensionWeights, FrameworkId, FrameworkView, JobTitleId, LevelRanges, ScoreBand,
    ScoringRanges, SeniorityLevel, UserId, WeightInput, WorkspaceId,
};
pub use repository::{FrameworkRepository, RepositoryError};
pub use router::framework_router;
pub use service::{
    CreateTemplateRequest, DuplicateLineage, DuplicateRequest, FrameworkRevision,
    FrameworkServiceError, FrameworkServiceOptions, FrameworkVersioningService, NewVersionOutcome,
    NewVersionRequest,
};
pub use validation::{
    validate_competencies, validate_name, validate_ranges, validate_weights,
    FrameworkValidationError, RangeScope,
};
