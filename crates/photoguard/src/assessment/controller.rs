use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::catalog::QuestionSet;
use super::domain::{Answer, AnswerValue, Question, QuestionKind};

/// Externally visible lifecycle of a questionnaire run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    NotStarted,
    InProgress,
    Completed,
}

impl ControllerPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for ControllerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    NotStarted,
    InProgress { current: usize },
    Completed,
}

impl RunState {
    fn phase(self) -> ControllerPhase {
        match self {
            Self::NotStarted => ControllerPhase::NotStarted,
            Self::InProgress { .. } => ControllerPhase::InProgress,
            Self::Completed => ControllerPhase::Completed,
        }
    }
}

/// Position of the respondent within the question set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    /// 1-based position of the question on screen; equals `total` once completed.
    pub position: usize,
    pub percent: f32,
}

/// Errors raised while stepping through a question set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestionnaireError {
    #[error("question index {index} is outside the question set (length {length})")]
    OutOfRange { index: usize, length: usize },
    #[error("`{operation}` requires the questionnaire to be {required}, but it is {actual}")]
    InvalidState {
        operation: &'static str,
        required: ControllerPhase,
        actual: ControllerPhase,
    },
    #[error("an assessment is already in progress; reset before starting a new one")]
    AlreadyInProgress,
    #[error("invalid answer: {reason}")]
    InvalidAnswer { reason: String },
    #[error("a question set must contain at least one question")]
    EmptyQuestionSet,
}

/// Walks a question set strictly forward, one answer per question.
///
/// A controller owns exactly one run. Concurrent respondents each need their own
/// instance; the type performs no internal locking.
#[derive(Debug, Clone)]
pub struct QuestionnaireController {
    questions: Arc<QuestionSet>,
    state: RunState,
    answers: Vec<Answer>,
}

impl QuestionnaireController {
    pub fn new(questions: Arc<QuestionSet>) -> Self {
        Self {
            questions,
            state: RunState::NotStarted,
            answers: Vec::new(),
        }
    }

    pub fn question_set(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn phase(&self) -> ControllerPhase {
        self.state.phase()
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            RunState::InProgress { current } => Some(current),
            _ => None,
        }
    }

    pub fn start(&mut self) -> Result<(), QuestionnaireError> {
        if let RunState::InProgress { .. } = self.state {
            return Err(QuestionnaireError::AlreadyInProgress);
        }

        self.answers.clear();
        self.state = RunState::InProgress { current: 0 };
        debug!(questions = self.questions.length(), "questionnaire started");
        Ok(())
    }

    pub fn current_question(&self) -> Result<&Question, QuestionnaireError> {
        let current = self.require_in_progress("current_question")?;
        self.questions.at(current)
    }

    /// Records the answer for the current question and advances the cursor.
    ///
    /// Attachment steps accept any value and store an acknowledgement; yes/no
    /// questions reject attachment acknowledgements.
    pub fn submit_answer(
        &mut self,
        value: AnswerValue,
    ) -> Result<ControllerPhase, QuestionnaireError> {
        let current = self.require_in_progress("submit_answer")?;
        let question = self.questions.at(current)?;

        let value = match (question.kind, value) {
            (QuestionKind::YesNo, value @ AnswerValue::YesNo { .. }) => value,
            (QuestionKind::YesNo, AnswerValue::Attachment { .. }) => {
                return Err(QuestionnaireError::InvalidAnswer {
                    reason: format!("question {} expects a yes or no answer", current + 1),
                });
            }
            (QuestionKind::Attachment, value @ AnswerValue::Attachment { .. }) => value,
            (QuestionKind::Attachment, AnswerValue::YesNo { .. }) => AnswerValue::acknowledged(),
        };

        self.answers.push(Answer {
            question_index: current,
            value,
        });

        if current + 1 >= self.questions.length() {
            self.state = RunState::Completed;
            info!(answers = self.answers.len(), "questionnaire completed");
        } else {
            self.state = RunState::InProgress {
                current: current + 1,
            };
            debug!(next = current + 1, "questionnaire advanced");
        }

        Ok(self.state.phase())
    }

    pub fn completed_answers(&self) -> Result<&[Answer], QuestionnaireError> {
        match self.state {
            RunState::Completed => Ok(&self.answers),
            other => Err(QuestionnaireError::InvalidState {
                operation: "completed_answers",
                required: ControllerPhase::Completed,
                actual: other.phase(),
            }),
        }
    }

    /// Answers recorded so far, including a partial run.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn progress(&self) -> Option<Progress> {
        let total = self.questions.length();
        let position = match self.state {
            RunState::NotStarted => return None,
            RunState::InProgress { current } => current + 1,
            RunState::Completed => total,
        };

        Some(Progress {
            answered: self.answers.len(),
            total,
            position,
            percent: position as f32 / total as f32 * 100.0,
        })
    }

    pub fn reset(&mut self) {
        self.answers.clear();
        self.state = RunState::NotStarted;
        debug!("questionnaire reset");
    }

    /// Rebuilds a run from a previously captured answer sequence.
    pub fn restore(&mut self, answers: Vec<Answer>) -> Result<ControllerPhase, QuestionnaireError> {
        match self.state {
            RunState::NotStarted => {}
            RunState::InProgress { .. } => return Err(QuestionnaireError::AlreadyInProgress),
            RunState::Completed => {
                return Err(QuestionnaireError::InvalidState {
                    operation: "restore",
                    required: ControllerPhase::NotStarted,
                    actual: ControllerPhase::Completed,
                })
            }
        }

        let length = self.questions.length();
        if answers.len() > length {
            return Err(QuestionnaireError::OutOfRange {
                index: length,
                length,
            });
        }

        for (position, answer) in answers.iter().enumerate() {
            if answer.question_index != position {
                return Err(QuestionnaireError::InvalidAnswer {
                    reason: format!(
                        "answer at position {position} references question {}",
                        answer.question_index
                    ),
                });
            }
            let question = self.questions.at(position)?;
            if answer.value.kind() != question.kind {
                return Err(QuestionnaireError::InvalidAnswer {
                    reason: format!(
                        "answer at position {position} is {} but the question expects {}",
                        answer.value.kind().label(),
                        question.kind.label()
                    ),
                });
            }
        }

        self.state = if answers.len() == length {
            RunState::Completed
        } else {
            RunState::InProgress {
                current: answers.len(),
            }
        };
        self.answers = answers;
        info!(
            restored = self.answers.len(),
            phase = %self.state.phase(),
            "questionnaire restored"
        );
        Ok(self.state.phase())
    }

    fn require_in_progress(&self, operation: &'static str) -> Result<usize, QuestionnaireError> {
        match self.state {
            RunState::InProgress { current } => Ok(current),
            other => Err(QuestionnaireError::InvalidState {
                operation,
                required: ControllerPhase::InProgress,
                actual: other.phase(),
            }),
        }
    }
}
