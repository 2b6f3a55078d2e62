use super::common::*;
use crate::workflows::competency::assessments::domain::AssessmentStatus;
use crate::workflows::competency::assessments::service::{
    AssessmentServiceError, SaveScoresRequest,
};

#[test]
fn draft_permits_mutation_and_submission_freezes_it() {
    let (service, _, _, _) = build_service();
    let assessment = service
        .create(&self_actor(), self_request())
        .expect("draft created");
    assert_eq!(assessment.status, AssessmentStatus::Draft);

    let saved = service
        .save_scores(
            &self_actor(),
            &assessment.id,
            SaveScoresRequest {
                scores: uniform_sheet(&framework(), 3),
                ..SaveScoresRequest::default()
            },
        )
        .expect("scores saved");

    let submitted = service
        .submit(&self_actor(), &saved.id)
        .expect("submission accepted");
    assert_eq!(submitted.status, AssessmentStatus::SelfSubmitted);
    assert!(submitted.submitted_at.is_some());

    match service.save_scores(
        &self_actor(),
        &submitted.id,
        SaveScoresRequest {
            scores: uniform_sheet(&framework(), 1),
            ..SaveScoresRequest::default()
        },
    ) {
        Err(AssessmentServiceError::ScoresLocked { status }) => {
            assert_eq!(status, AssessmentStatus::SelfSubmitted);
        }
        other => panic!("expected locked scores, got {other:?}"),
    }
}

#[test]
fn incomplete_sheets_cannot_be_submitted() {
    let (service, _, _, _) = build_service();
    let assessment = service
        .create(&self_actor(), self_request())
        .expect("draft created");
    service
        .save_scores(
            &self_actor(),
            &assessment.id,
            SaveScoresRequest {
                scores: incomplete_sheet(&framework()),
                ..SaveScoresRequest::default()
            },
        )
        .expect("scores saved");

    match service.submit(&self_actor(), &assessment.id) {
        Err(AssessmentServiceError::Incomplete { scored, expected }) => {
            assert_eq!(scored, 9);
            assert_eq!(expected, 10);
        }
        other => panic!("expected completion gate rejection, got {other:?}"),
    }
}

#[test]
fn self_assessments_are_submitted_by_the_evaluated_user_only() {
    let (service, _, _, _) = build_service();
    let assessment = service
        .create(&self_actor(), self_request())
        .expect("draft created");
    service
        .save_scores(
            &self_actor(),
            &assessment.id,
            SaveScoresRequest {
                scores: uniform_sheet(&framework(), 2),
                ..SaveScoresRequest::default()
            },
        )
        .expect("scores saved");

    match service.submit(&leader_actor(), &assessment.id) {
        Err(AssessmentServiceError::Access(err)) => {
            assert_eq!(err.to_string(), "not authorized");
        }
        other => panic!("expected access rejection, got {other:?}"),
    }
}

#[test]
fn leader_assessments_follow_the_leader_submission_edge() {
    let (service, _, _, _) = build_service();
    let assessment = service
        .create(&leader_actor(), leader_request())
        .expect("draft created");
    service
        .save_scores(
            &leader_actor(),
            &assessment.id,
            SaveScoresRequest {
                scores: uniform_sheet(&framework(), 2),
                ..SaveScoresRequest::default()
            },
        )
        .expect("scores saved");

    let submitted = service
        .submit(&leader_actor(), &assessment.id)
        .expect("leader submission accepted");
    assert_eq!(submitted.status, AssessmentStatus::LeaderSubmitted);
}

#[test]
fn calibration_follows_submission_and_appends_notes() {
    let (service, _, _, _) = build_service();
    let assessment = service
        .create(&self_actor(), self_request())
        .expect("draft created");

    match service.calibrate(&leader_actor(), &assessment.id, "too early".to_string()) {
        Err(AssessmentServiceError::Transition(err)) => {
            assert!(err.to_string().contains("draft"));
        }
        other => panic!("expected transition rejection, got {other:?}"),
    }

    service
        .save_scores(
            &self_actor(),
            &assessment.id,
            SaveScoresRequest {
                scores: uniform_sheet(&framework(), 3),
                ..SaveScoresRequest::default()
            },
        )
        .expect("scores saved");
    service
        .submit(&self_actor(), &assessment.id)
        .expect("submission accepted");

    let calibrated = service
        .calibrate(
            &leader_actor(),
            &assessment.id,
            "confirmed with the team lead".to_string(),
        )
        .expect("calibration accepted");

    assert_eq!(calibrated.status, AssessmentStatus::Calibrated);
    assert!(calibrated.calibrated_at.is_some());
    assert_eq!(calibrated.calibration_notes.len(), 1);
    assert_eq!(calibrated.calibration_notes[0].author, leader_user());
    assert_eq!(
        calibrated.calibration_notes[0].note,
        "confirmed with the team lead"
    );
}

#[test]
fn members_cannot_calibrate() {
    let (service, _, _, _) = build_service();
    let assessment = service
        .create(&self_actor(), self_request())
        .expect("draft created");

    assert!(matches!(
        service.calibrate(&stranger_actor(), &assessment.id, "nope".to_string()),
        Err(AssessmentServiceError::Access(_))
    ));
}

#[test]
fn cancellation_reaches_every_non_terminal_state() {
    let (service, _, _, _) = build_service();

    // From draft.
    let draft = service
        .create(&self_actor(), self_request())
        .expect("draft created");
    let cancelled = service
        .cancel(&admin_actor(), &draft.id)
        .expect("draft cancellable");
    assert_eq!(cancelled.status, AssessmentStatus::Cancelled);

    // From submitted.
    let submitted = service
        .create(&self_actor(), self_request())
        .expect("draft created");
    service
        .save_scores(
            &self_actor(),
            &submitted.id,
            SaveScoresRequest {
                scores: uniform_sheet(&framework(), 3),
                ..SaveScoresRequest::default()
            },
        )
        .expect("scores saved");
    service
        .submit(&self_actor(), &submitted.id)
        .expect("submission accepted");
    service
        .cancel(&admin_actor(), &submitted.id)
        .expect("submitted cancellable");

    // Terminal states stay terminal.
    match service.cancel(&admin_actor(), &submitted.id) {
        Err(AssessmentServiceError::Transition(err)) => {
            assert!(err.to_string().contains("cancelled"));
        }
        other => panic!("expected transition rejection, got {other:?}"),
    }
}

#[test]
fn cancellation_is_an_administrative_override() {
    let (service, _, _, _) = build_service();
    let assessment = service
        .create(&self_actor(), self_request())
        .expect("draft created");

    assert!(matches!(
        service.cancel(&self_actor(), &assessment.id),
        Err(AssessmentServiceError::Access(_))
    ));
}

#[test]
fn calibrated_assessments_cannot_be_recalibrated() {
    let (service, _, _, _) = build_service();
    let assessment = service
        .create(&self_actor(), self_request())
        .expect("draft created");
    service
        .save_scores(
            &self_actor(),
            &assessment.id,
            SaveScoresRequest {
                scores: uniform_sheet(&framework(), 3),
                ..SaveScoresRequest::default()
            },
        )
        .expect("scores saved");
    service
        .submit(&self_actor(), &assessment.id)
        .expect("submission accepted");
    service
        .calibrate(&leader_actor(), &assessment.id, "done".to_string())
        .expect("calibration accepted");

    assert!(matches!(
        service.calibrate(&leader_actor(), &assessment.id, "again".to_string()),
        Err(AssessmentServiceError::Transition(_))
    ));
}
