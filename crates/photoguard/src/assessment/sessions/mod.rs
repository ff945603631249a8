//! Server-hosted questionnaire sessions: one controller per respondent.

pub mod repository;
pub mod router;
pub mod service;

pub use repository::{
    AssessmentId, AssessmentSession, RepositoryError, SessionRepository, SessionView,
};
pub use router::{assessment_router, AnswerSubmission};
pub use service::{AssessmentService, AssessmentServiceError};
