//! Photosensitivity questionnaire: question catalog, stepping controller, and
//! the triage resolver that maps a completed answer sequence to a tier.

mod catalog;
pub mod controller;
pub mod domain;
pub mod sessions;
pub mod triage;

#[cfg(test)]
mod tests;

pub use catalog::{QuestionSet, QuestionSpec};
pub use controller::{ControllerPhase, Progress, QuestionnaireController, QuestionnaireError};
pub use domain::{Answer, AnswerValue, AttachmentRef, Question, QuestionKind};
pub use sessions::{
    assessment_router, AssessmentId, AssessmentService, AssessmentServiceError,
    AssessmentSession, RepositoryError, SessionRepository, SessionView,
};
pub use triage::{
    AssessmentResult, TierDefinition, TierTable, TierTableError, TriageError, TriageResolver,
    MEDICAL_WARNING,
};

use std::sync::Arc;
use tracing::info;

use crate::config::AssessmentConfig;

/// Builds the configured question set and validates its tier table once.
pub fn load(config: &AssessmentConfig) -> Result<TriageResolver, TriageError> {
    let questions = Arc::new(if config.photo_step {
        QuestionSet::standard_with_photo_step()
    } else {
        QuestionSet::standard()
    });
    let scorable = questions.count_scorable() as u32;

    let table = match &config.tier_table_path {
        Some(path) => TierTable::from_json_path(path, scorable)?,
        None => TierTable::standard(scorable)?,
    };

    info!(
        questions = questions.length(),
        scorable,
        tiers = table.tiers().len(),
        "assessment catalog loaded"
    );
    TriageResolver::new(questions, table)
}
