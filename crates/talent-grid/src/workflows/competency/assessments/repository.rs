use super::super::frameworks::domain::WorkspaceId;
use super::domain::{AssessmentId, SeniorityAssessment};

pub use super::super::frameworks::repository::RepositoryError;

/// Storage abstraction over the `seniority_assessments` table.
///
/// Updates are last-write-wins at the row level: auto-save and manual save
/// both land here with their own freshly derived results, so a stale winner
/// is still internally consistent (spec'd behavior, no optimistic token).
pub trait AssessmentRepository: Send + Sync {
    fn insert(
        &self,
        assessment: SeniorityAssessment,
    ) -> Result<SeniorityAssessment, RepositoryError>;

    fn update(&self, assessment: SeniorityAssessment) -> Result<(), RepositoryError>;

    fn fetch(&self, id: &AssessmentId) -> Result<Option<SeniorityAssessment>, RepositoryError>;

    /// All assessments in a workspace, newest first.
    fn for_workspace(
        &self,
        workspace: &WorkspaceId,
    ) -> Result<Vec<SeniorityAssessment>, RepositoryError>;
}
