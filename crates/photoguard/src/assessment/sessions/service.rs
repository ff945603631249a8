use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::repository::{
    AssessmentId, AssessmentSession, RepositoryError, SessionRepository, SessionView,
};
use crate::assessment::controller::{ControllerPhase, QuestionnaireController, QuestionnaireError};
use crate::assessment::domain::AnswerValue;
use crate::assessment::triage::{AssessmentResult, TierTable, TriageError, TriageResolver};
use crate::store::{AssessmentRecord, StateStore, StoreError};

/// Service giving every respondent an independent questionnaire run.
pub struct AssessmentService<R, S> {
    repository: Arc<R>,
    store: Arc<S>,
    resolver: Arc<TriageResolver>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asmt-{id:06}"))
}

impl<R, S> AssessmentService<R, S>
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    pub fn new(repository: Arc<R>, store: Arc<S>, resolver: Arc<TriageResolver>) -> Self {
        Self {
            repository,
            store,
            resolver,
        }
    }

    pub fn tiers(&self) -> &TierTable {
        self.resolver.table()
    }

    /// Opens a new session and positions it on the first question.
    pub fn start(&self) -> Result<SessionView, AssessmentServiceError> {
        let mut controller = QuestionnaireController::new(self.resolver.shared_question_set());
        controller.start()?;

        let session = AssessmentSession {
            id: next_assessment_id(),
            controller,
        };
        let stored = self.repository.insert(session)?;
        info!(assessment_id = %stored.id, "assessment session opened");
        Ok(stored.view(None))
    }

    pub fn current(&self, id: &AssessmentId) -> Result<SessionView, AssessmentServiceError> {
        let session = self.load(id)?;
        let result = self.completed_result(&session)?;
        Ok(session.view(result))
    }

    /// Records an answer; on the final answer the result is resolved and persisted.
    pub fn submit(
        &self,
        id: &AssessmentId,
        value: AnswerValue,
    ) -> Result<SessionView, AssessmentServiceError> {
        let (session, phase) = self.repository.modify(id, |session| {
            let phase = session.controller.submit_answer(value)?;
            Ok::<_, AssessmentServiceError>((session.clone(), phase))
        })?;

        if phase != ControllerPhase::Completed {
            return Ok(session.view(None));
        }

        let result = self
            .resolver
            .build_result(session.controller.completed_answers()?)?;
        if result.tier.is_urgent {
            warn!(
                assessment_id = %session.id,
                yes_count = result.yes_count,
                tier = %result.tier.key,
                "assessment resolved to an urgent tier"
            );
        } else {
            info!(
                assessment_id = %session.id,
                yes_count = result.yes_count,
                tier = %result.tier.key,
                "assessment resolved"
            );
        }
        self.store
            .record_assessment(AssessmentRecord::from_result(&result, Utc::now()))?;

        Ok(session.view(Some(result)))
    }

    pub fn reset(&self, id: &AssessmentId) -> Result<SessionView, AssessmentServiceError> {
        self.repository.modify(id, |session| {
            session.controller.reset();
            Ok::<_, AssessmentServiceError>(session.view(None))
        })
    }

    /// Begins a fresh run on an existing session; fails while one is in progress.
    pub fn restart(&self, id: &AssessmentId) -> Result<SessionView, AssessmentServiceError> {
        self.repository.modify(id, |session| {
            session.controller.start()?;
            Ok::<_, AssessmentServiceError>(session.view(None))
        })
    }

    pub fn result(&self, id: &AssessmentId) -> Result<AssessmentResult, AssessmentServiceError> {
        let session = self.load(id)?;
        let answers = session.controller.completed_answers()?;
        Ok(self.resolver.build_result(answers)?)
    }

    pub fn close(&self, id: &AssessmentId) -> Result<(), AssessmentServiceError> {
        self.repository.remove(id)?;
        Ok(())
    }

    fn load(&self, id: &AssessmentId) -> Result<AssessmentSession, AssessmentServiceError> {
        let session = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }

    fn completed_result(
        &self,
        session: &AssessmentSession,
    ) -> Result<Option<AssessmentResult>, AssessmentServiceError> {
        match session.controller.completed_answers() {
            Ok(answers) => Ok(Some(self.resolver.build_result(answers)?)),
            Err(_) => Ok(None),
        }
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Questionnaire(#[from] QuestionnaireError),
    #[error(transparent)]
    Triage(#[from] TriageError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
