use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::workflows::competency::access::{Actor, ActorRole};
use crate::workflows::competency::audit::{AuditEntry, AuditError, AuditLogWriter};
use crate::workflows::competency::frameworks::domain::{
    CompetencyDefinition, CompetencyFramework, CompetencyId, CompetencyMatrix, FrameworkId,
    JobTitleId, LevelRanges, ScoreBand, ScoringRanges, UserId, WeightInput,
};
use crate::workflows::competency::frameworks::repository::{FrameworkRepository, RepositoryError};
use crate::workflows::competency::frameworks::service::{
    CreateTemplateRequest, FrameworkVersioningService,
};

pub(super) fn job_title() -> JobTitleId {
    JobTitleId("account-executive".to_string())
}

pub(super) fn system_owner() -> Actor {
    Actor {
        user_id: UserId("user-owner".to_string()),
        role: ActorRole::SystemOwner,
    }
}

pub(super) fn member() -> Actor {
    Actor {
        user_id: UserId("user-member".to_string()),
        role: ActorRole::Member,
    }
}

pub(super) fn weights() -> WeightInput {
    WeightInput::Fraction {
        behavioral: 0.5,
        technical: 0.3,
        process: 0.2,
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

pub(super) fn matrix() -> CompetencyMatrix {
    CompetencyMatrix {
        behavioral: definitions("beh", 2),
        technical: definitions("tech", 2),
        process: definitions("proc", 1),
    }
}

pub(super) fn standard_bands() -> LevelRanges {
    LevelRanges {
        junior: ScoreBand { min: 0, max: 60 },
        pleno: ScoreBand { min: 61, max: 80 },
        senior: ScoreBand { min: 81, max: 100 },
    }
}

pub(super) fn ranges() -> ScoringRanges {
    ScoringRanges {
        behavioral: standard_bands(),
        technical: standard_bands(),
        process: standard_bands(),
        global: standard_bands(),
    }
}

pub(super) fn create_request(name: &str) -> CreateTemplateRequest {
    CreateTemplateRequest {
        job_title_id: job_title(),
        name: name.to_string(),
        weights: weights(),
        competencies: matrix(),
        ranges: ranges(),
    }
}

#[derive(Default)]
pub(super) struct MemoryFrameworkRepository {
    records: Mutex<HashMap<FrameworkId, CompetencyFramework>>,
    referenced: Mutex<HashSet<FrameworkId>>,
}

impl MemoryFrameworkRepository {
    pub(super) fn mark_referenced(&self, id: &FrameworkId) {
        self.referenced
            .lock()
            .expect("referenced mutex poisoned")
            .insert(id.clone());
    }

    pub(super) fn active_rows(&self, job_title: &JobTitleId) -> Vec<CompetencyFramework> {
        self.records
            .lock()
            .expect("framework mutex poisoned")
            .values()
            .filter(|row| {
                row.job_title_id == *job_title && row.is_global_template() && row.is_active
            })
            .cloned()
            .collect()
    }
}

impl FrameworkRepository for MemoryFrameworkRepository {
    fn insert(
        &self,
        framework: CompetencyFramework,
    ) -> Result<CompetencyFramework, RepositoryError> {
        let mut guard = self.records.lock().expect("framework mutex poisoned");
        if guard.contains_key(&framework.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(framework.id.clone(), framework.clone());
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
        let mut rows: Vec<CompetencyFramework> = guard
            .values()
            .filter(|row| row.job_title_id == *job_title && row.is_template)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(rows)
    }

    fn publish_template(
        &self,
        framework: CompetencyFramework,
    ) -> Result<CompetencyFramework, RepositoryError> {
        let mut guard = self.records.lock().expect("framework mutex poisoned");
        if guard.contains_key(&framework.id) {
            return Err(RepositoryError::Conflict);
        }
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
            if row.job_title_id == *job_title && row.is_template && row.is_active && row.id != *keep
            {
                row.is_active = false;
                demoted += 1;
            }
        }
        Ok(demoted)
    }

    fn is_referenced(&self, id: &FrameworkId) -> Result<bool, RepositoryError> {
        Ok(self
            .referenced
            .lock()
            .expect("referenced mutex poisoned")
            .contains(id))
    }

    fn delete(&self, id: &FrameworkId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("framework mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
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

pub(super) fn build_service() -> (
    FrameworkVersioningService<MemoryFrameworkRepository, MemoryAuditLog>,
    Arc<MemoryFrameworkRepository>,
    Arc<MemoryAuditLog>,
) {
    let repository = Arc::new(MemoryFrameworkRepository::default());
    let audit = Arc::new(MemoryAuditLog::default());
    let service = FrameworkVersioningService::new(repository.clone(), audit.clone());
    (service, repository, audit)
}
