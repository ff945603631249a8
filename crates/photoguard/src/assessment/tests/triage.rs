use std::io::Cursor;
use std::sync::Arc;

use super::common::*;
use crate::assessment::{
    Answer, AnswerValue, TierTable, TierTableError, TriageError, TriageResolver,
};

#[test]
fn standard_table_partitions_fifteen_questions() {
    let table = TierTable::standard(15).expect("valid");
    for yes_count in 0..=15 {
        let matching = table
            .tiers()
            .iter()
            .filter(|tier| tier.contains(yes_count))
            .count();
        assert_eq!(matching, 1, "yes-count {yes_count} must match exactly one tier");
    }
    let keys: Vec<&str> = table.tiers().iter().map(|tier| tier.key.as_str()).collect();
    assert_eq!(keys, vec!["mild", "moderate", "severe"]);
    assert_eq!(table.tiers()[0].range_label(), "0–5 Yes answers");
}

#[test]
fn standard_table_rejects_other_question_counts() {
    assert!(matches!(
        TierTable::standard(20),
        Err(TierTableError::DoesNotCover {
            covered: 15,
            expected: 20
        })
    ));
}

#[test]
fn all_no_answers_resolve_to_stage_one() {
    let resolver = standard_resolver();
    let result = resolver.build_result(&answers_with_yes(0)).expect("resolves");
    assert_eq!(result.yes_count, 0);
    assert_eq!(result.scorable_count, 15);
    assert_eq!(result.tier.key, "mild");
    assert!(result.tier.label.starts_with("Stage 1"));
    assert!(!result.tier.is_urgent);
    assert_eq!(result.tier.recommended_actions.len(), 4);
}

#[test]
fn upper_bound_of_mild_is_inclusive() {
    let resolver = standard_resolver();
    let result = resolver.build_result(&answers_with_yes(5)).unwrap();
    assert_eq!(result.yes_count, 5);
    assert_eq!(result.tier.key, "mild");
}

#[test]
fn lower_bound_of_moderate_is_inclusive() {
    let resolver = standard_resolver();
    let result = resolver.build_result(&answers_with_yes(6)).unwrap();
    assert_eq!(result.yes_count, 6);
    assert_eq!(result.tier.key, "moderate");
    assert!(result.tier.label.starts_with("Stage 2"));
}

#[test]
fn all_yes_answers_resolve_to_urgent_stage_three() {
    let resolver = standard_resolver();
    let result = resolver.build_result(&answers_with_yes(15)).unwrap();
    assert_eq!(result.yes_count, 15);
    assert_eq!(result.tier.key, "severe");
    assert!(result.tier.is_urgent);
    assert!(result.summary().contains("15 of 15"));
}

#[test]
fn partial_sequences_are_malformed() {
    let resolver = standard_resolver();
    let controller = completed_controller(standard_set(), &[true, true, false]);
    match resolver.build_result(controller.answers()) {
        Err(TriageError::Malformed {
            expected: 15,
            actual: 3,
        }) => {}
        other => panic!("expected malformed sequence, got {other:?}"),
    }
}

#[test]
fn attachment_acknowledgements_never_score() {
    let resolver = TriageResolver::standard(photo_set()).expect("photo set has 15 scorable");
    let mut answers = answers_with_yes(15);
    answers.push(Answer {
        question_index: 15,
        value: AnswerValue::acknowledged(),
    });
    let result = resolver.build_result(&answers).unwrap();
    assert_eq!(result.yes_count, 15);
    assert_eq!(result.scorable_count, 15);
}

#[test]
fn build_result_is_deterministic() {
    let resolver = standard_resolver();
    let answers = answers_with_yes(9);
    let first = resolver.build_result(&answers).unwrap();
    let second = resolver.build_result(&answers).unwrap();
    assert_eq!(first, second);
}

#[test]
fn custom_table_on_short_set() {
    let set = short_set();
    let resolver = TriageResolver::new(set.clone(), two_tier_table(2)).expect("covers 0..=2");
    let controller = completed_controller(set, &[true, false, true]);
    let result = resolver
        .build_result(controller.completed_answers().unwrap())
        .unwrap();
    assert_eq!(result.yes_count, 2, "attachment step ignored");
    assert_eq!(result.tier.key, "high");
}

#[test]
fn resolver_rejects_tables_for_a_different_question_count() {
    assert!(matches!(
        TriageResolver::new(short_set(), two_tier_table(15)),
        Err(TriageError::Table(TierTableError::DoesNotCover {
            covered: 15,
            expected: 2
        }))
    ));
}

#[test]
fn resolve_tier_reports_uncovered_counts() {
    let resolver = standard_resolver();
    assert!(matches!(
        resolver.resolve_tier(16),
        Err(TriageError::NoMatchingTier(16))
    ));
}

#[test]
fn table_validation_detects_gaps_and_overlaps() {
    let gap = TierTable::new(vec![tier("a", 0, 4, false), tier("b", 6, 15, true)], 15);
    assert!(matches!(gap, Err(TierTableError::Gap { end: 4, start: 6, .. })));

    let overlap = TierTable::new(vec![tier("a", 0, 6, false), tier("b", 6, 15, true)], 15);
    assert!(matches!(overlap, Err(TierTableError::Overlap { at: 6, .. })));

    let late_start = TierTable::new(vec![tier("a", 1, 15, false)], 15);
    assert!(matches!(
        late_start,
        Err(TierTableError::DoesNotStartAtZero { lower: 1, .. })
    ));

    let inverted = TierTable::new(vec![tier("a", 0, 15, false), tier("b", 9, 3, false)], 15);
    assert!(matches!(inverted, Err(TierTableError::InvertedBounds { .. })));

    assert!(matches!(
        TierTable::new(Vec::new(), 15),
        Err(TierTableError::Empty)
    ));
}

#[test]
fn table_rows_are_sorted_before_validation() {
    let table = TierTable::new(
        vec![
            tier("c", 11, 15, true),
            tier("a", 0, 5, false),
            tier("b", 6, 10, false),
        ],
        15,
    )
    .expect("unsorted input is accepted");
    assert_eq!(table.find(6).map(|tier| tier.key.as_str()), Some("b"));
}

#[test]
fn tables_load_from_json() {
    let raw = r#"[
        {"key": "low", "lower_bound": 0, "upper_bound": 7, "label": "Low", "guidance_text": "Use sunscreen."},
        {"key": "high", "lower_bound": 8, "upper_bound": 15, "label": "High", "guidance_text": "Call a doctor.", "is_urgent": true}
    ]"#;
    let table = TierTable::from_json_reader(Cursor::new(raw), 15).expect("valid json table");
    let resolver = TriageResolver::new(Arc::new(crate::assessment::QuestionSet::standard()), table)
        .expect("covers standard set");
    let result = resolver.build_result(&answers_with_yes(8)).unwrap();
    assert_eq!(result.tier.key, "high");
    assert!(result.tier.is_urgent);
    assert!(result.tier.recommended_actions.is_empty());

    assert!(matches!(
        TierTable::from_json_reader(Cursor::new("not json"), 15),
        Err(TierTableError::Json(_))
    ));
}
