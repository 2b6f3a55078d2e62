use crate::infra::{demo_template_request, CompetencyStore, InMemoryAuditLog};
use clap::Args;
use std::sync::Arc;
use talent_grid::error::AppError;
use talent_grid::workflows::competency::access::{Actor, ActorRole};
use talent_grid::workflows::competency::assessments::{
    assessments_csv_string, AssessmentService, AssessmentType, CreateAssessmentRequest,
    SaveScoresRequest, ScoreSheet, ScoringEngine, SeniorityAssessment,
};
use talent_grid::workflows::competency::frameworks::{
    CompetencyFramework, Dimension, FrameworkRevision, FrameworkVersioningService,
    NewVersionRequest, UserId, WorkspaceId,
};

#[derive(Args, Debug)]
pub(crate) struct ScoringPreviewArgs {
    /// Score (0-3) applied to every behavioral competency
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub(crate) behavioral: u8,
    /// Score (0-3) applied to every technical competency
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub(crate) technical: u8,
    /// Score (0-3) applied to every process competency
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub(crate) process: u8,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Assessment period tag used throughout the walkthrough
    #[arg(long, default_value = "2026-Q3")]
    pub(crate) period: String,
    /// Print the audit trail at the end of the demo
    #[arg(long)]
    pub(crate) show_audit: bool,
    /// Print the workspace CSV export at the end of the demo
    #[arg(long)]
    pub(crate) show_export: bool,
}

fn owner() -> Actor {
    Actor {
        user_id: UserId("user-owner".to_string()),
        role: ActorRole::SystemOwner,
    }
}

fn seller() -> Actor {
    Actor {
        user_id: UserId("user-eva".to_string()),
        role: ActorRole::Member,
    }
}

fn leader() -> Actor {
    Actor {
        user_id: UserId("user-lead".to_string()),
        role: ActorRole::Leader,
    }
}

type DemoFrameworkService = FrameworkVersioningService<CompetencyStore, InMemoryAuditLog>;
type DemoAssessmentService = AssessmentService<CompetencyStore, CompetencyStore, InMemoryAuditLog>;

fn build_services() -> (
    Arc<DemoFrameworkService>,
    Arc<DemoAssessmentService>,
    Arc<InMemoryAuditLog>,
) {
    let store = Arc::new(CompetencyStore::default());
    let audit = Arc::new(InMemoryAuditLog::default());
    let frameworks = Arc::new(FrameworkVersioningService::new(store.clone(), audit.clone()));
    let assessments = Arc::new(AssessmentService::new(store.clone(), store, audit.clone()));
    (frameworks, assessments, audit)
}

fn sheet_with(framework: &CompetencyFramework, behavioral: u8, technical: u8, process: u8) -> ScoreSheet {
    let mut sheet = ScoreSheet::default();
    for (dimension, value) in [
        (Dimension::Behavioral, behavioral),
        (Dimension::Technical, technical),
        (Dimension::Process, process),
    ] {
        let scores = sheet.for_dimension_mut(dimension);
        for definition in framework.competencies.for_dimension(dimension) {
            scores.insert(definition.id.clone(), value);
        }
    }
    sheet
}

fn render_results(assessment: &SeniorityAssessment) {
    for result in &assessment.results.dimensions {
        println!(
            "  - {}: {}/{} points | total {:.1} | {}",
            result.dimension.label(),
            result.raw_points,
            result.max_points,
            result.total,
            result.level.label()
        );
    }
    println!(
        "  Global: {:.1} -> {}",
        assessment.results.global.score,
        assessment.results.global.level.label()
    );
}

pub(crate) fn run_scoring_preview(args: ScoringPreviewArgs) -> Result<(), AppError> {
    let (frameworks, _, _) = build_services();
    let framework = frameworks.create_template(&owner(), demo_template_request())?;

    let sheet = sheet_with(&framework, args.behavioral, args.technical, args.process);
    let engine = ScoringEngine::new(&framework);
    let results = engine.results(&sheet);

    println!("Scoring preview against '{}'", framework.name);
    println!(
        "Uniform scores: behavioral={} technical={} process={}",
        args.behavioral, args.technical, args.process
    );
    for result in &results.dimensions {
        println!(
            "- {}: {}/{} points | total {:.1} | {}",
            result.dimension.label(),
            result.raw_points,
            result.max_points,
            result.total,
            result.level.label()
        );
    }
    println!(
        "Global: {:.1} -> {}",
        results.global.score,
        results.global.level.label()
    );

    let completion = engine.completion(&sheet);
    if completion.is_complete() {
        println!("Sheet is submittable ({} of {} scored)", completion.scored, completion.expected);
    } else {
        println!(
            "Sheet would be rejected at submission ({} of {} scored)",
            completion.scored, completion.expected
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let (frameworks, assessments, audit) = build_services();

    println!("Competency management demo ({})", args.period);

    println!("\nPublishing the Account Executive template");
    let v1 = frameworks.create_template(&owner(), demo_template_request())?;
    println!(
        "- {} v{} ({} competencies, active={})",
        v1.name,
        v1.version,
        v1.competencies.total_count(),
        v1.is_active
    );

    println!("\nOpening a self-assessment for {}", seller().user_id);
    let draft = assessments.create(
        &seller(),
        CreateAssessmentRequest {
            workspace_id: WorkspaceId("ws-north".to_string()),
            evaluated_user: seller().user_id,
            evaluator: None,
            job_title_id: v1.job_title_id.clone(),
            assessment_type: AssessmentType::SelfReview,
            period: args.period.clone(),
        },
    )?;
    println!("- {} created in status {}", draft.id, draft.status.label());

    println!("\nAuto-saving a partial sheet (process dimension untouched)");
    let partial = assessments.save_scores(
        &seller(),
        &draft.id,
        SaveScoresRequest {
            scores: sheet_with(&v1, 3, 2, 0),
            ..SaveScoresRequest::default()
        },
    )?;
    render_results(&partial);

    match assessments.submit(&seller(), &draft.id) {
        Ok(_) => println!("  Unexpectedly submittable"),
        Err(err) => println!("  Submission blocked: {err}"),
    }

    println!("\nSaving the completed sheet and submitting");
    assessments.save_scores(
        &seller(),
        &draft.id,
        SaveScoresRequest {
            scores: sheet_with(&v1, 3, 2, 2),
            ..SaveScoresRequest::default()
        },
    )?;
    let submitted = assessments.submit(&seller(), &draft.id)?;
    println!("- Status now {}", submitted.status.label());
    render_results(&submitted);

    println!("\nCalibrating with {}", leader().user_id);
    let calibrated = assessments.calibrate(
        &leader(),
        &draft.id,
        "Aligned with the quarterly talent review".to_string(),
    )?;
    println!(
        "- Status {} at {}",
        calibrated.status.label(),
        calibrated
            .calibrated_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_default()
    );

    println!("\nPublishing a name-only edit as a new version");
    let outcome = frameworks.create_new_version(
        &owner(),
        NewVersionRequest {
            job_title_id: v1.job_title_id.clone(),
            parent_framework_id: None,
            fields: FrameworkRevision {
                name: Some("Account Executive Framework (revised)".to_string()),
                ..FrameworkRevision::default()
            },
        },
    )?;
    println!(
        "- v{} '{}' chains to {} and inherits weights={}",
        outcome.framework.version,
        outcome.framework.name,
        outcome.previous.id,
        outcome.framework.weights == outcome.previous.weights
    );

    println!("\nVersion history");
    for row in frameworks.history(&v1.job_title_id)? {
        println!(
            "- v{} '{}' active={} parent={}",
            row.version,
            row.name,
            row.is_active,
            row.parent_framework_id
                .as_ref()
                .map(|id| id.0.as_str())
                .unwrap_or("-")
        );
    }

    if args.show_export {
        println!("\nWorkspace CSV export");
        let rows = assessments.for_workspace(&WorkspaceId("ws-north".to_string()))?;
        match assessments_csv_string(&rows) {
            Ok(csv) => print!("{csv}"),
            Err(err) => println!("  Export unavailable: {err}"),
        }
    }

    if args.show_audit {
        println!("\nAudit trail");
        for entry in audit.entries() {
            println!(
                "- {} by {} (before={}, after={})",
                entry.action.label(),
                entry.actor,
                entry.before.is_some(),
                entry.after.is_some()
            );
        }
    }

    Ok(())
}
