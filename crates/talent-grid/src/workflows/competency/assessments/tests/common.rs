use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::workflows::competency::access::{Actor, ActorRole};
use crate::workflows::competency::assessments::domain::{
    AssessmentId, AssessmentType, ScoreSheet, SeniorityAssessment,
};
use crate::workflows::competency::assessments::repository::AssessmentRepository;
use crate::workflows::competency::assessments::service::{
    AssessmentService, CreateAssessmentRequest,
};
use crate::workflows::competency::audit::{AuditEntry, AuditError, AuditLogWriter};
use crate::workflows::competency::frameworks::domain::{
    CompetencyDefinition, CompetencyFramework, CompetencyId, CompetencyMatrix, Dimension,
    DimensionWeights, FrameworkId, JobTitleId, LevelRanges, ScoreBand, ScoringRanges, UserId,
    WorkspaceId,
};
use crate::workflows::competency::frameworks::repository::{FrameworkRepository, RepositoryError};

pub(super) fn job_title() -> JobTitleId {
    JobTitleId("account-executive".to_string())
}

pub(super) fn workspace() -> WorkspaceId {
    WorkspaceId("ws-north".to_string())
}

pub(super) fn evaluated_user() -> UserId {
    UserId("user-eva".to_string())
}

pub(super) fn leader_user() -> UserId {
    UserId("user-lead".to_string())
}

pub(super) fn self_actor() -> Actor {
    Actor {
        user_id: evaluated_user(),
        role: ActorRole::Member,
    }
}

pub(super) fn leader_actor() -> Actor {
    Actor {
        user_id: leader_user(),
        role: ActorRole::Leader,
    }
}

pub(super) fn admin_actor() -> Actor {
    Actor {
        user_id: UserId("user-admin".to_string()),
        role: ActorRole::WorkspaceAdmin,
    }
}

pub(super) fn stranger_actor() -> Actor {
    Actor {
        user_id: UserId("user-stranger".to_string()),
        role: ActorRole::Member,
    }
}

fn definitions(prefix: &str, count: usize) -> Vec<CompetencyDefinition> {
    (1..=count)
        .map(|index| CompetencyDefinition {
            id: CompetencyId(format!("{prefix}-{index}")),
            name: format!("{prefix} competency {index}"),
            description: String::new(),
        })
        .collect()
}

pub(super) fn standard_bands() -> LevelRanges {
    LevelRanges {
        junior: ScoreBand { min: 0, max: 60 },
        pleno: ScoreBand { min: 61, max: 80 },
        senior: ScoreBand { min: 81, max: 100 },
    }
}

/// Framework with ten competencies (4 behavioral, 3 technical, 3 process)
/// and the standard band layout.
pub(super) fn framework() -> CompetencyFramework {
    CompetencyFramework {
        id: FrameworkId("fw-test-001".to_string()),
        job_title_id: job_title(),
        workspace_id: None,
        name: "AE Framework".to_string(),
        weights: DimensionWeights::from_fractions(0.5, 0.3, 0.2),
        competencies: CompetencyMatrix {
            behavioral: definitions("beh", 4),
            technical: definitions("tech", 3),
            process: definitions("proc", 3),
        },
        ranges: ScoringRanges {
            behavioral: standard_bands(),
            technical: standard_bands(),
            process: standard_bands(),
            global: standard_bands(),
        },
        is_template: true,
        parent_framework_id: None,
        version: 1,
        is_active: true,
        created_by: UserId("user-owner".to_string()),
        published_at: Utc::now(),
    }
}

/// Sheet scoring `value` for every competency of the framework.
pub(super) fn uniform_sheet(framework: &CompetencyFramework, value: u8) -> ScoreSheet {
    let mut sheet = ScoreSheet::default();
    for dimension in Dimension::ALL {
        let scores = sheet.for_dimension_mut(dimension);
        for definition in framework.competencies.for_dimension(dimension) {
            scores.insert(definition.id.clone(), value);
        }
    }
    sheet
}

/// Full sheet with one competency left unscored.
pub(super) fn incomplete_sheet(framework: &CompetencyFramework) -> ScoreSheet {
    let mut sheet = uniform_sheet(framework, 3);
    let first = framework.competencies.behavioral[0].id.clone();
    sheet.behavioral.insert(first, 0);
    sheet
}

#[derive(Default)]
pub(super) struct MemoryFrameworkRepository {
    records: Mutex<HashMap<FrameworkId, CompetencyFramework>>,
}

impl MemoryFrameworkRepository {
    pub(super) fn seed(&self, framework: CompetencyFramework) {
        self.records
            .lock()
            .expect("framework mutex poisoned")
            .insert(framework.id.clone(), framework);
    }

    pub(super) fn remove(&self, id: &FrameworkId) {
        self.records
            .lock()
            .expect("framework mutex poisoned")
            .remove(id);
    }
}

impl FrameworkRepository for MemoryFrameworkRepository {
    fn insert(
        &self,
        framework: CompetencyFramework,
    ) -> Result<CompetencyFramework, RepositoryError> {
        self.seed(framework.clone());
        Ok(framework)
    }

    fn fetch(&self, id: &FrameworkId) -> Result<Option<CompetencyFramework>, RepositoryError> {
        let guard = self.records.lock().expect("framework mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn active_template(
        &self,
        job_title: &JobTitleId,
    ) -> Result<Option<CompetencyFramework>, RepositoryError> {
        let guard = self.records.lock().expect("framework mutex poisoned");
        Ok(guard
            .values()
            .filter(|row| {
                row.job_title_id == *job_title && row.is_global_template() && row.is_active
            })
            .max_by_key(|row| row.version)
            .cloned())
    }

    fn max_template_version(&self, job_title: &JobTitleId) -> Result<Option<u32>, RepositoryError> {
        let guard = self.records.lock().expect("framework mutex poisoned");
        Ok(guard
            .values()
            .filter(|row| row.job_title_id == *job_title && row.is_template)
            .map(|row| row.version)
            .max())
    }

    fn templates_for(
        &self,
        job_title: &JobTitleId,
    ) -> Result<Vec<CompetencyFramework>, RepositoryError> {
        let guard = self.records.lock().expect("framework mutex poisoned");
        Ok(guard
            .values()
            .filter(|row| row.job_title_id == *job_title && row.is_template)
            .cloned()
            .collect())
    }

    fn publish_template(
        &self,
        framework: CompetencyFramework,
    ) -> Result<CompetencyFramework, RepositoryError> {
        let mut guard = self.records.lock().expect("framework mutex poisoned");
        for row in guard.values_mut() {
            if row.job_title_id == framework.job_title_id && row.is_global_template() {
                row.is_active = false;
            }
        }
        guard.insert(framework.id.clone(), framework.clone());
        Ok(framework)
    }

    fn deactivate_others(
        &self,
        job_title: &JobTitleId,
        keep: &FrameworkId,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("framework mutex poisoned");
        let mut demoted = 0;
        for row in guard.values_mut() {
            if row.job_title_id == *job_title && row.is_active && row.id != *keep {
                row.is_active = false;
                demoted += 1;
            }
        }
        Ok(demoted)
    }

    fn is_referenced(&self, _id: &FrameworkId) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn delete(&self, id: &FrameworkId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("framework mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(super) struct MemoryAssessmentRepository {
    records: Mutex<HashMap<AssessmentId, SeniorityAssessment>>,
}

impl AssessmentRepository for MemoryAssessmentRepository {
    fn insert(
        &self,
        assessment: SeniorityAssessment,
    ) -> Result<SeniorityAssessment, RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        if guard.contains_key(&assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(assessment.id.clone(), assessment.clone());
        Ok(assessment)
    }

    fn update(&self, assessment: SeniorityAssessment) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        if guard.contains_key(&assessment.id) {
            guard.insert(assessment.id.clone(), assessment);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<SeniorityAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_workspace(
        &self,
        workspace: &WorkspaceId,
    ) -> Result<Vec<SeniorityAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        let mut rows: Vec<SeniorityAssessment> = guard
            .values()
            .filter(|row| row.workspace_id == *workspace)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[derive(Default)]
pub(super) struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub(super) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLogWriter for MemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

pub(super) type TestService =
    AssessmentService<MemoryFrameworkRepository, MemoryAssessmentRepository, MemoryAuditLog>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryFrameworkRepository>,
    Arc<MemoryAssessmentRepository>,
    Arc<MemoryAuditLog>,
) {
    let frameworks = Arc::new(MemoryFrameworkRepository::default());
    frameworks.seed(framework());
    let assessments = Arc::new(MemoryAssessmentRepository::default());
    let audit = Arc::new(MemoryAuditLog::default());
    let service = AssessmentService::new(frameworks.clone(), assessments.clone(), audit.clone());
    (service, frameworks, assessments, audit)
}

pub(super) fn self_request() -> CreateAssessmentRequest {
    CreateAssessmentRequest {
        workspace_id: workspace(),
        evaluated_user: evaluated_user(),
        evaluator: None,
        job_title_id: job_title(),
        assessment_type: AssessmentType::SelfReview,
        period: "2026-Q3".to_string(),
    }
}

pub(super) fn leader_request() -> CreateAssessmentRequest {
    CreateAssessmentRequest {
        workspace_id: workspace(),
        evaluated_user: evaluated_user(),
        evaluator: Some(leader_user()),
        job_title_id: job_title(),
        assessment_type: AssessmentType::Leader,
        period: "2026-Q3".to_string(),
    }
}
