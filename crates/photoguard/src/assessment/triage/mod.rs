mod table;

pub use table::{TierDefinition, TierTable, TierTableError};

use serde::Serialize;
use std::sync::Arc;

use super::catalog::QuestionSet;
use super::domain::{Answer, AnswerValue, QuestionKind};

/// Advisory shown alongside every result regardless of tier.
pub const MEDICAL_WARNING: &str =
    "Always consult with a healthcare professional before starting any new medication.";

/// Failures while scoring or resolving a completed answer sequence.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("answer sequence has {actual} answers but the question set has {expected}")]
    Malformed { expected: usize, actual: usize },
    #[error("no tier covers a yes-count of {0}")]
    NoMatchingTier(u32),
    #[error(transparent)]
    Table(#[from] TierTableError),
}

/// Yes-count and the tier it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentResult {
    pub yes_count: u32,
    pub scorable_count: u32,
    pub tier: TierDefinition,
}

impl AssessmentResult {
    pub fn summary(&self) -> String {
        format!(
            "{} ({} of {} answered yes)",
            self.tier.label, self.yes_count, self.scorable_count
        )
    }
}

/// Pure scoring over a question set and its validated tier table.
#[derive(Debug, Clone)]
pub struct TriageResolver {
    questions: Arc<QuestionSet>,
    table: TierTable,
}

impl TriageResolver {
    /// Binds a table to a question set, checking it covers exactly `[0, scorable]`.
    pub fn new(questions: Arc<QuestionSet>, table: TierTable) -> Result<Self, TriageError> {
        let expected = scorable_count(&questions);
        let covered = table.covered_max();
        if covered != expected {
            return Err(TierTableError::DoesNotCover { covered, expected }.into());
        }
        Ok(Self { questions, table })
    }

    pub fn standard(questions: Arc<QuestionSet>) -> Result<Self, TriageError> {
        let table = TierTable::standard(scorable_count(&questions))?;
        Self::new(questions, table)
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }

    pub fn question_set(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn shared_question_set(&self) -> Arc<QuestionSet> {
        Arc::clone(&self.questions)
    }

    /// Counts `true` yes/no answers; attachment acknowledgements never count.
    pub fn score(&self, answers: &[Answer]) -> Result<u32, TriageError> {
        let expected = self.questions.length();
        if answers.len() != expected {
            return Err(TriageError::Malformed {
                expected,
                actual: answers.len(),
            });
        }

        let yes_count = answers
            .iter()
            .zip(self.questions.questions())
            .filter(|(answer, question)| {
                question.kind == QuestionKind::YesNo
                    && matches!(answer.value, AnswerValue::YesNo { value: true })
            })
            .count();

        Ok(yes_count as u32)
    }

    pub fn resolve_tier(&self, yes_count: u32) -> Result<&TierDefinition, TriageError> {
        self.table
            .find(yes_count)
            .ok_or(TriageError::NoMatchingTier(yes_count))
    }

    pub fn build_result(&self, answers: &[Answer]) -> Result<AssessmentResult, TriageError> {
        let yes_count = self.score(answers)?;
        let tier = self.resolve_tier(yes_count)?.clone();
        Ok(AssessmentResult {
            yes_count,
            scorable_count: scorable_count(&self.questions),
            tier,
        })
    }
}

fn scorable_count(questions: &QuestionSet) -> u32 {
    questions.count_scorable() as u32
}
