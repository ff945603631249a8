use super::common::*;
use crate::assessment::{
    Answer, AnswerValue, AttachmentRef, ControllerPhase, QuestionnaireController,
    QuestionnaireError,
};

#[test]
fn new_controller_is_not_started() {
    let controller = QuestionnaireController::new(standard_set());
    assert_eq!(controller.phase(), ControllerPhase::NotStarted);
    assert_eq!(controller.current_index(), None);
    assert!(controller.answers().is_empty());
    assert!(controller.progress().is_none());
    assert!(matches!(
        controller.current_question(),
        Err(QuestionnaireError::InvalidState {
            required: ControllerPhase::InProgress,
            actual: ControllerPhase::NotStarted,
            ..
        })
    ));
}

#[test]
fn submit_before_start_is_invalid_state() {
    let mut controller = QuestionnaireController::new(standard_set());
    assert!(matches!(
        controller.submit_answer(AnswerValue::yes()),
        Err(QuestionnaireError::InvalidState { .. })
    ));
    assert!(controller.answers().is_empty());
}

#[test]
fn steps_forward_one_question_per_answer() {
    let mut controller = QuestionnaireController::new(standard_set());
    controller.start().expect("starts");

    for expected in 0..15 {
        assert_eq!(controller.current_index(), Some(expected));
        assert_eq!(controller.current_question().unwrap().index, expected);
        let phase = controller
            .submit_answer(AnswerValue::from(expected % 2 == 0))
            .expect("answer accepted");
        if expected < 14 {
            assert_eq!(phase, ControllerPhase::InProgress);
        } else {
            assert_eq!(phase, ControllerPhase::Completed);
        }
    }

    let answers = controller.completed_answers().expect("completed");
    assert_eq!(answers.len(), 15);
    assert!(answers
        .iter()
        .enumerate()
        .all(|(position, answer)| answer.question_index == position));
    assert_eq!(controller.current_index(), None);
}

#[test]
fn completed_answers_unavailable_mid_run() {
    let controller = completed_controller(standard_set(), &[true, false, true]);
    assert_eq!(controller.phase(), ControllerPhase::InProgress);
    assert!(matches!(
        controller.completed_answers(),
        Err(QuestionnaireError::InvalidState {
            operation: "completed_answers",
            actual: ControllerPhase::InProgress,
            ..
        })
    ));
}

#[test]
fn start_while_in_progress_requires_reset() {
    let mut controller = completed_controller(standard_set(), &[true]);
    assert_eq!(controller.start(), Err(QuestionnaireError::AlreadyInProgress));
    assert_eq!(controller.answers().len(), 1, "failed start keeps the run");

    controller.reset();
    controller.start().expect("starts after reset");
    assert_eq!(controller.current_index(), Some(0));
    assert!(controller.answers().is_empty());
}

#[test]
fn start_after_completion_begins_a_fresh_run() {
    let mut controller = completed_controller(standard_set(), &[true; 15]);
    assert_eq!(controller.phase(), ControllerPhase::Completed);
    controller.start().expect("retake");
    assert_eq!(controller.current_index(), Some(0));
    assert!(controller.answers().is_empty());
}

#[test]
fn yes_no_questions_reject_acknowledgements() {
    let mut controller = QuestionnaireController::new(short_set());
    controller.start().unwrap();
    let err = controller
        .submit_answer(AnswerValue::acknowledged())
        .expect_err("yes/no question needs a boolean");
    assert!(matches!(err, QuestionnaireError::InvalidAnswer { .. }));
    assert_eq!(controller.current_index(), Some(0), "cursor unchanged");
    assert!(controller.answers().is_empty());
}

#[test]
fn attachment_steps_record_acknowledgements_for_any_value() {
    let mut controller = QuestionnaireController::new(short_set());
    controller.start().unwrap();
    controller.submit_answer(AnswerValue::yes()).unwrap();

    assert_eq!(
        controller.current_question().unwrap().kind,
        crate::assessment::QuestionKind::Attachment
    );
    controller.submit_answer(AnswerValue::yes()).unwrap();
    assert_eq!(
        controller.answers()[1],
        Answer {
            question_index: 1,
            value: AnswerValue::acknowledged()
        }
    );
}

#[test]
fn attachment_references_are_kept() {
    let mut controller = QuestionnaireController::new(short_set());
    controller.start().unwrap();
    controller.submit_answer(AnswerValue::no()).unwrap();
    let reference = AnswerValue::Attachment {
        reference: Some(AttachmentRef("uploads/forearm.jpg".to_string())),
    };
    controller.submit_answer(reference.clone()).unwrap();
    assert_eq!(controller.answers()[1].value, reference);
}

#[test]
fn progress_tracks_the_displayed_position() {
    let mut controller = QuestionnaireController::new(standard_set());
    controller.start().unwrap();
    let progress = controller.progress().expect("in progress");
    assert_eq!(progress.position, 1);
    assert_eq!(progress.answered, 0);
    assert!((progress.percent - 100.0 / 15.0).abs() < 1e-4);

    for _ in 0..15 {
        controller.submit_answer(AnswerValue::no()).unwrap();
    }
    let progress = controller.progress().expect("completed");
    assert_eq!(progress.position, 15);
    assert_eq!(progress.answered, 15);
    assert!((progress.percent - 100.0).abs() < 1e-4);
}

#[test]
fn reset_clears_from_any_state() {
    for answered in [0usize, 4, 15] {
        let mut controller =
            completed_controller(standard_set(), &vec![true; answered]);
        controller.reset();
        assert_eq!(controller.phase(), ControllerPhase::NotStarted);
        assert!(controller.answers().is_empty());
        controller.start().unwrap();
        assert_eq!(controller.current_index(), Some(0));
        assert!(controller.answers().is_empty());
    }
}

#[test]
fn restore_resumes_a_partial_run() {
    let mut controller = QuestionnaireController::new(standard_set());
    let phase = controller
        .restore(answers_with_yes(15).into_iter().take(6).collect())
        .expect("partial restore");
    assert_eq!(phase, ControllerPhase::InProgress);
    assert_eq!(controller.current_index(), Some(6));

    for _ in 6..15 {
        controller.submit_answer(AnswerValue::no()).unwrap();
    }
    let resolver = standard_resolver();
    let result = resolver
        .build_result(controller.completed_answers().unwrap())
        .unwrap();
    assert_eq!(result.yes_count, 6);
}

#[test]
fn restore_of_full_sequence_completes() {
    let mut controller = QuestionnaireController::new(standard_set());
    let phase = controller.restore(answers_with_yes(3)).expect("full restore");
    assert_eq!(phase, ControllerPhase::Completed);
    assert_eq!(controller.completed_answers().unwrap().len(), 15);
}

#[test]
fn restore_rejects_misordered_or_mistyped_answers() {
    let mut controller = QuestionnaireController::new(standard_set());
    let mut answers = answers_with_yes(2);
    answers.swap(0, 1);
    assert!(matches!(
        controller.restore(answers),
        Err(QuestionnaireError::InvalidAnswer { .. })
    ));

    let mistyped = vec![Answer {
        question_index: 0,
        value: AnswerValue::acknowledged(),
    }];
    assert!(matches!(
        controller.restore(mistyped),
        Err(QuestionnaireError::InvalidAnswer { .. })
    ));
    assert_eq!(controller.phase(), ControllerPhase::NotStarted);
}

#[test]
fn restore_rejects_overlong_sequences_and_active_runs() {
    let mut controller = QuestionnaireController::new(short_set());
    let overlong: Vec<Answer> = (0..4)
        .map(|index| Answer {
            question_index: index,
            value: AnswerValue::no(),
        })
        .collect();
    assert_eq!(
        controller.restore(overlong),
        Err(QuestionnaireError::OutOfRange {
            index: 3,
            length: 3
        })
    );

    controller.start().unwrap();
    assert_eq!(
        controller.restore(Vec::new()),
        Err(QuestionnaireError::AlreadyInProgress)
    );
}
