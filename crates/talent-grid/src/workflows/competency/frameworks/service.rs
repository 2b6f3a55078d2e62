use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::super::access::{require_system_owner, AccessError, Actor};
use super::super::audit::{snapshot, AuditAction, AuditEntry, AuditError, AuditLogWriter};
use super::domain::{
    CompetencyFramework, CompetencyMatrix, FrameworkId, JobTitleId, ScoringRanges, WeightInput,
};
use super::repository::{FrameworkRepository, RepositoryError};
use super::validation::{
    validate_competencies, validate_name, validate_ranges, validate_weights,
    FrameworkValidationError,
};

/// Whether a duplicated framework records the source as its parent. The
/// platform historically created detached copies while the edit path chains
/// versions; both behaviors stay available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateLineage {
    Linked,
    Detached,
}

/// Operator-tunable behavior of the versioning service.
#[derive(Debug, Clone, Copy)]
pub struct FrameworkServiceOptions {
    pub duplicate_lineage: DuplicateLineage,
}

impl Default for FrameworkServiceOptions {
    fn default() -> Self {
        Self {
            duplicate_lineage: DuplicateLineage::Detached,
        }
    }
}

/// Payload for the brand-new-job-title path. Every field is required; there
/// is no previous version to inherit from.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateRequest {
    pub job_title_id: JobTitleId,
    pub name: String,
    pub weights: WeightInput,
    pub competencies: CompetencyMatrix,
    pub ranges: ScoringRanges,
}

/// Partial field set for a new version; omitted fields inherit from the
/// resolved previous framework.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameworkRevision {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weights: Option<WeightInput>,
    #[serde(default)]
    pub competencies: Option<CompetencyMatrix>,
    #[serde(default)]
    pub ranges: Option<ScoringRanges>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVersionRequest {
    pub job_title_id: JobTitleId,
    /// Explicit ancestor to version from; defaults to the active template.
    #[serde(default)]
    pub parent_framework_id: Option<FrameworkId>,
    #[serde(default)]
    pub fields: FrameworkRevision,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DuplicateRequest {
    pub target_job_title_id: JobTitleId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lineage: Option<DuplicateLineage>,
}

/// Result of a version publish: the stored row plus the resolved previous
/// framework for audit diffing.
#[derive(Debug, Clone)]
pub struct NewVersionOutcome {
    pub framework: CompetencyFramework,
    pub previous: CompetencyFramework,
}

/// Service enforcing single-active-template-per-job-title and immutable
/// version history.
pub struct FrameworkVersioningService<R, L> {
    repository: Arc<R>,
    audit: Arc<L>,
    options: FrameworkServiceOptions,
}

static FRAMEWORK_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_framework_id() -> FrameworkId {
    let id = FRAMEWORK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    FrameworkId(format!("fw-{id:06}"))
}

impl<R, L> FrameworkVersioningService<R, L>
where
    R: FrameworkRepository + 'static,
    L: AuditLogWriter + 'static,
{
    pub fn new(repository: Arc<R>, audit: Arc<L>) -> Self {
        Self::with_options(repository, audit, FrameworkServiceOptions::default())
    }

    pub fn with_options(
        repository: Arc<R>,
        audit: Arc<L>,
        options: FrameworkServiceOptions,
    ) -> Self {
        Self {
            repository,
            audit,
            options,
        }
    }

    /// Publish the first template for a job title. Rejected when any
    /// template row already exists; edits go through `create_new_version`.
    pub fn create_template(
        &self,
        actor: &Actor,
        request: CreateTemplateRequest,
    ) -> Result<CompetencyFramework, FrameworkServiceError> {
        require_system_owner(actor)?;
        validate_name(&request.name)?;
        let weights = validate_weights(&request.weights)?;
        validate_competencies(&request.competencies)?;
        validate_ranges(&request.ranges)?;

        if self
            .repository
            .max_template_version(&request.job_title_id)?
            .is_some()
        {
            return Err(FrameworkServiceError::TemplateExists {
                job_title: request.job_title_id,
            });
        }

        let framework = CompetencyFramework {
            id: next_framework_id(),
            job_title_id: request.job_title_id,
            workspace_id: None,
            name: request.name,
            weights,
            competencies: request.competencies,
            ranges: request.ranges,
            is_template: true,
            parent_framework_id: None,
            version: 1,
            is_active: true,
            created_by: actor.user_id.clone(),
            published_at: Utc::now(),
        };

        let stored = self.repository.publish_template(framework)?;
        self.audit.record(AuditEntry::new(
            AuditAction::FrameworkCreated,
            actor.user_id.clone(),
            None,
            Some(snapshot(&stored)?),
        ))?;
        Ok(stored)
    }

    /// Publish a new immutable version for a job title.
    ///
    /// The previous framework resolves to the explicit parent when one is
    /// supplied, else to the current active template. Supplied fields are
    /// validated; omitted fields inherit. The version is always
    /// `max(existing) + 1`, so versioning from a non-latest ancestor still
    /// moves the history forward.
    pub fn create_new_version(
        &self,
        actor: &Actor,
        request: NewVersionRequest,
    ) -> Result<NewVersionOutcome, FrameworkServiceError> {
        require_system_owner(actor)?;
        let previous =
            self.resolve_previous(&request.job_title_id, request.parent_framework_id.as_ref())?;

        let name = match request.fields.name {
            Some(name) => {
                validate_name(&name)?;
                name
            }
            None => previous.name.clone(),
        };
        let weights = match request.fields.weights.as_ref() {
            Some(input) => validate_weights(input)?,
            None => previous.weights.clone(),
        };
        let competencies = match request.fields.competencies {
            Some(matrix) => {
                validate_competencies(&matrix)?;
                matrix
            }
            None => previous.competencies.clone(),
        };
        let ranges = match request.fields.ranges {
            Some(ranges) => {
                validate_ranges(&ranges)?;
                ranges
            }
            None => previous.ranges.clone(),
        };

        let next_version = self
            .repository
            .max_template_version(&request.job_title_id)?
            .unwrap_or(0)
            + 1;

        let framework = CompetencyFramework {
            id: next_framework_id(),
            job_title_id: request.job_title_id.clone(),
            workspace_id: None,
            name,
            weights,
            competencies,
            ranges,
            is_template: true,
            parent_framework_id: Some(previous.id.clone()),
            version: next_version,
            is_active: true,
            created_by: actor.user_id.clone(),
            published_at: Utc::now(),
        };

        let stored = self.repository.publish_template(framework)?;
        // The publish itself is atomic; the sweep only repairs rows that were
        // already inconsistent before this call.
        self.repository
            .deactivate_others(&request.job_title_id, &stored.id)?;

        self.audit.record(AuditEntry::new(
            AuditAction::FrameworkVersioned,
            actor.user_id.clone(),
            Some(snapshot(&previous)?),
            Some(snapshot(&stored)?),
        ))?;

        Ok(NewVersionOutcome {
            framework: stored,
            previous,
        })
    }

    /// Copy a framework onto another job title. Lineage linkage follows the
    /// request, falling back to the service default.
    pub fn duplicate_template(
        &self,
        actor: &Actor,
        source_framework_id: &FrameworkId,
        request: DuplicateRequest,
    ) -> Result<CompetencyFramework, FrameworkServiceError> {
        require_system_owner(actor)?;
        let source = self
            .repository
            .fetch(source_framework_id)?
            .ok_or(RepositoryError::NotFound)?;

        let name = match request.name {
            Some(name) => {
                validate_name(&name)?;
                name
            }
            None => source.name.clone(),
        };
        let lineage = request.lineage.unwrap_or(self.options.duplicate_lineage);
        let next_version = self
            .repository
            .max_template_version(&request.target_job_title_id)?
            .unwrap_or(0)
            + 1;

        let framework = CompetencyFramework {
            id: next_framework_id(),
            job_title_id: request.target_job_title_id.clone(),
            workspace_id: None,
            name,
            weights: source.weights.clone(),
            competencies: source.competencies.clone(),
            ranges: source.ranges.clone(),
            is_template: true,
            parent_framework_id: match lineage {
                DuplicateLineage::Linked => Some(source.id.clone()),
                DuplicateLineage::Detached => None,
            },
            version: next_version,
            is_active: true,
            created_by: actor.user_id.clone(),
            published_at: Utc::now(),
        };

        let stored = self.repository.publish_template(framework)?;
        self.repository
            .deactivate_others(&request.target_job_title_id, &stored.id)?;

        self.audit.record(AuditEntry::new(
            AuditAction::FrameworkDuplicated,
            actor.user_id.clone(),
            Some(snapshot(&source)?),
            Some(snapshot(&stored)?),
        ))?;

        Ok(stored)
    }

    /// Remove a framework row. Rejected while any assessment references it.
    pub fn delete_template(
        &self,
        actor: &Actor,
        id: &FrameworkId,
    ) -> Result<(), FrameworkServiceError> {
        require_system_owner(actor)?;
        let framework = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;

        if self.repository.is_referenced(id)? {
            return Err(FrameworkServiceError::FrameworkInUse { id: id.clone() });
        }

        self.repository.delete(id)?;
        self.audit.record(AuditEntry::new(
            AuditAction::FrameworkDeleted,
            actor.user_id.clone(),
            Some(snapshot(&framework)?),
            None,
        ))?;
        Ok(())
    }

    pub fn get(&self, id: &FrameworkId) -> Result<CompetencyFramework, FrameworkServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(FrameworkServiceError::Repository(RepositoryError::NotFound))
    }

    /// The active template for a job title. Zero active rows surface as the
    /// recoverable "no framework configured" state rather than a failure of
    /// this layer.
    pub fn active_for(
        &self,
        job_title: &JobTitleId,
    ) -> Result<CompetencyFramework, FrameworkServiceError> {
        self.repository.active_template(job_title)?.ok_or_else(|| {
            FrameworkServiceError::NoActiveTemplate {
                job_title: job_title.clone(),
            }
        })
    }

    /// Full version history for a job title, newest first.
    pub fn history(
        &self,
        job_title: &JobTitleId,
    ) -> Result<Vec<CompetencyFramework>, FrameworkServiceError> {
        Ok(self.repository.templates_for(job_title)?)
    }

    fn resolve_previous(
        &self,
        job_title: &JobTitleId,
        parent: Option<&FrameworkId>,
    ) -> Result<CompetencyFramework, FrameworkServiceError> {
        match parent {
            Some(id) => {
                let parent = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
                if !parent.is_global_template() || parent.job_title_id != *job_title {
                    return Err(FrameworkServiceError::ParentMismatch {
                        framework: id.clone(),
                        job_title: job_title.clone(),
                    });
                }
                Ok(parent)
            }
            None => self.repository.active_template(job_title)?.ok_or_else(|| {
                FrameworkServiceError::NoActiveTemplate {
                    job_title: job_title.clone(),
                }
            }),
        }
    }
}

/// Error raised by the versioning service.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkServiceError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Validation(#[from] FrameworkValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("no framework configured for this job title")]
    NoActiveTemplate { job_title: JobTitleId },
    #[error("a template already exists for job title '{job_title}'; publish a new version instead")]
    TemplateExists { job_title: JobTitleId },
    #[error("framework '{framework}' is not a template of job title '{job_title}'")]
    ParentMismatch {
        framework: FrameworkId,
        job_title: JobTitleId,
    },
    #[error("framework '{id}' is still referenced by assessments and cannot be deleted")]
    FrameworkInUse { id: FrameworkId },
}
