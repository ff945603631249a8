use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assessment::controller::{ControllerPhase, Progress, QuestionnaireController};
use crate::assessment::domain::Question;
use crate::assessment::triage::AssessmentResult;

/// Identifier handed to the respondent's client for an assessment run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One respondent's run. Every session owns an independent controller.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    pub id: AssessmentId,
    pub controller: QuestionnaireController,
}

impl AssessmentSession {
    pub fn view(&self, result: Option<AssessmentResult>) -> SessionView {
        SessionView {
            assessment_id: self.id.clone(),
            phase: self.controller.phase(),
            status: self.controller.phase().label(),
            progress: self.controller.progress(),
            question: self.controller.current_question().ok().cloned(),
            result,
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: AssessmentSession) -> Result<AssessmentSession, RepositoryError>;
    /// Applies `apply` to the stored session while holding the repository's
    /// lock. The change is kept only when `apply` returns `Ok`.
    fn modify<T, E, F>(&self, id: &AssessmentId, apply: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut AssessmentSession) -> Result<T, E>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentSession>, RepositoryError>;
    fn remove(&self, id: &AssessmentId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Response payload describing where a session stands.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub assessment_id: AssessmentId,
    pub phase: ControllerPhase,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
}
