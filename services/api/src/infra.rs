use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use talent_grid::config::CompetencyConfig;
use talent_grid::workflows::competency::assessments::{
    AssessmentId, AssessmentRepository, SeniorityAssessment,
};
use talent_grid::workflows::competency::audit::{AuditEntry, AuditError, AuditLogWriter};
use talent_grid::workflows::competency::frameworks::{
    CompetencyDefinition, CompetencyFramework, CompetencyId, CompetencyMatrix,
    CreateTemplateRequest, DuplicateLineage, FrameworkId, FrameworkRepository,
    FrameworkServiceOptions, JobTitleId, LevelRanges, RepositoryError, ScoreBand, ScoringRanges,
    WeightInput,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory stand-in for the hosted relational store. Both logical tables
/// live behind one struct so the framework side can answer "is this row still
/// referenced by an assessment", and so `publish_template` swaps the active
/// row under a single lock.
#[derive(Default)]
pub(crate) struct CompetencyStore {
    frameworks: Mutex<HashMap<FrameworkId, CompetencyFramework>>,
    assessments: Mutex<HashMap<AssessmentId, SeniorityAssessment>>,
}

impl FrameworkRepository for CompetencyStore {
    fn insert(
        &self,
        framework: CompetencyFramework,
    ) -> Result<CompetencyFramework, RepositoryError> {
        let mut guard = self.frameworks.lock().expect("framework mutex poisoned");
        if guard.contains_key(&framework.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(framework.id.clone(), framework.clone());
        Ok(framework)
    }

    fn fetch(&self, id: &FrameworkId) -> Result<Option<CompetencyFramework>, RepositoryError> {
        let guard = self.frameworks.lock().expect("framework mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn active_template(
        &self,
        job_title: &JobTitleId,
    ) -> Result<Option<CompetencyFramework>, RepositoryError> {
        let guard = self.frameworks.lock().expect("framework mutex poisoned");
        Ok(guard
            .values()
            .filter(|row| {
                row.job_title_id == *job_title && row.is_global_template() && row.is_active
            })
            .max_by_key(|row| row.version)
            .cloned())
    }

    fn max_template_version(&self, job_title: &JobTitleId) -> Result<Option<u32>, RepositoryError> {
        let guard = self.frameworks.lock().expect("framework mutex poisoned");
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
        let guard = self.frameworks.lock().expect("framework mutex poisoned");
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
        let mut guard = self.frameworks.lock().expect("framework mutex poisoned");
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
        let mut guard = self.frameworks.lock().expect("framework mutex poisoned");
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
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard.values().any(|row| row.framework_id == *id))
    }

    fn delete(&self, id: &FrameworkId) -> Result<(), RepositoryError> {
        let mut guard = self.frameworks.lock().expect("framework mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

impl AssessmentRepository for CompetencyStore {
    fn insert(
        &self,
        assessment: SeniorityAssessment,
    ) -> Result<SeniorityAssessment, RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        if guard.contains_key(&assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(assessment.id.clone(), assessment.clone());
        Ok(assessment)
    }

    fn update(&self, assessment: SeniorityAssessment) -> Result<(), RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
        if guard.contains_key(&assessment.id) {
            guard.insert(assessment.id.clone(), assessment);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<SeniorityAssessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_workspace(
        &self,
        workspace: &talent_grid::workflows::competency::frameworks::WorkspaceId,
    ) -> Result<Vec<SeniorityAssessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
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
pub(crate) struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub(crate) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLogWriter for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry);
        Ok(())
    }
}

pub(crate) fn framework_options(config: &CompetencyConfig) -> FrameworkServiceOptions {
    FrameworkServiceOptions {
        duplicate_lineage: if config.link_duplicates {
            DuplicateLineage::Linked
        } else {
            DuplicateLineage::Detached
        },
    }
}

fn definitions(pairs: &[(&str, &str)]) -> Vec<CompetencyDefinition> {
    pairs
        .iter()
        .map(|(id, name)| CompetencyDefinition {
            id: CompetencyId((*id).to_string()),
            name: (*name).to_string(),
            description: String::new(),
        })
        .collect()
}

fn standard_bands() -> LevelRanges {
    LevelRanges {
        junior: ScoreBand { min: 0, max: 60 },
        pleno: ScoreBand { min: 61, max: 80 },
        senior: ScoreBand { min: 81, max: 100 },
    }
}

/// The built-in Account Executive framework used by the demo and the scoring
/// preview command.
pub(crate) fn demo_template_request() -> CreateTemplateRequest {
    CreateTemplateRequest {
        job_title_id: JobTitleId("account-executive".to_string()),
        name: "Account Executive Framework".to_string(),
        weights: WeightInput::Fraction {
            behavioral: 0.5,
            technical: 0.3,
            process: 0.2,
        },
        competencies: CompetencyMatrix {
            behavioral: definitions(&[
                ("beh-listening", "Active listening"),
                ("beh-resilience", "Resilience"),
                ("beh-coachability", "Coachability"),
                ("beh-empathy", "Customer empathy"),
            ]),
            technical: definitions(&[
                ("tech-product", "Product depth"),
                ("tech-discovery", "Discovery questioning"),
                ("tech-objections", "Objection handling"),
            ]),
            process: definitions(&[
                ("proc-crm", "CRM hygiene"),
                ("proc-forecast", "Forecast accuracy"),
                ("proc-territory", "Territory planning"),
            ]),
        },
        ranges: ScoringRanges {
            behavioral: standard_bands(),
            technical: standard_bands(),
            process: standard_bands(),
            global: standard_bands(),
        },
    }
}
