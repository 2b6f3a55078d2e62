use super::domain::{CompetencyFramework, FrameworkId, JobTitleId};

/// Storage abstraction over the `competency_frameworks` table so the
/// versioning service can be exercised in isolation.
///
/// `publish_template` carries the consistency-critical contract: the
/// implementation must deactivate the current active global template for the
/// row's job title and insert the new row as active in a single atomic step.
/// Two concurrent publishes for the same job title must serialize, leaving
/// exactly one active row; the deactivate-then-insert write pair and its
/// compensating rollback are folded into this one operation.
pub trait FrameworkRepository: Send + Sync {
    fn insert(&self, framework: CompetencyFramework)
        -> Result<CompetencyFramework, RepositoryError>;

    fn fetch(&self, id: &FrameworkId) -> Result<Option<CompetencyFramework>, RepositoryError>;

    /// The single active global template for a job title, if any.
    fn active_template(
        &self,
        job_title: &JobTitleId,
    ) -> Result<Option<CompetencyFramework>, RepositoryError>;

    /// Highest version across every template row of the job title, active or
    /// not. `None` when the job title has no templates yet.
    fn max_template_version(&self, job_title: &JobTitleId) -> Result<Option<u32>, RepositoryError>;

    /// All template rows for a job title, newest version first.
    fn templates_for(
        &self,
        job_title: &JobTitleId,
    ) -> Result<Vec<CompetencyFramework>, RepositoryError>;

    /// Atomic swap: deactivate the currently active template for the row's
    /// job title (when one exists) and insert `framework` as the active row.
    fn publish_template(
        &self,
        framework: CompetencyFramework,
    ) -> Result<CompetencyFramework, RepositoryError>;

    /// Force every template row for the job title inactive except `keep`.
    /// Returns how many rows were demoted. A correct store never demotes
    /// anything here; the sweep exists for pre-existing data anomalies.
    fn deactivate_others(
        &self,
        job_title: &JobTitleId,
        keep: &FrameworkId,
    ) -> Result<usize, RepositoryError>;

    /// Whether any assessment still references the framework row.
    fn is_referenced(&self, id: &FrameworkId) -> Result<bool, RepositoryError>;

    fn delete(&self, id: &FrameworkId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
