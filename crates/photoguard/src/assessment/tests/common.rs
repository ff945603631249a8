use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessment::sessions::{
    assessment_router, AssessmentId, AssessmentService, AssessmentSession, RepositoryError,
    SessionRepository,
};
use crate::assessment::{
    Answer, AnswerValue, QuestionSet, QuestionSpec, QuestionnaireController, TierDefinition,
    TierTable, TriageResolver,
};
use crate::store::MemoryStateStore;

pub(super) fn standard_set() -> Arc<QuestionSet> {
    Arc::new(QuestionSet::standard())
}

pub(super) fn photo_set() -> Arc<QuestionSet> {
    Arc::new(QuestionSet::standard_with_photo_step())
}

pub(super) fn short_set() -> Arc<QuestionSet> {
    Arc::new(
        QuestionSet::new(vec![
            QuestionSpec::yes_no("Does sunlight make your skin burn?").in_section("Reaction"),
            QuestionSpec::attachment("Attach a photo (optional)."),
            QuestionSpec::yes_no("Are you taking doxycycline?").in_section("Medication"),
        ])
        .expect("non-empty set"),
    )
}

pub(super) fn tier(key: &str, lower: u32, upper: u32, urgent: bool) -> TierDefinition {
    TierDefinition {
        key: key.to_string(),
        lower_bound: lower,
        upper_bound: upper,
        label: format!("{key} tier"),
        guidance_text: format!("guidance for {key}"),
        recommended_actions: Vec::new(),
        actions_heading: None,
        actions_note: None,
        is_urgent: urgent,
    }
}

pub(super) fn standard_resolver() -> TriageResolver {
    TriageResolver::standard(standard_set()).expect("standard table covers 15 questions")
}

/// Answers for the standard set: the first `yes` questions answered true.
pub(super) fn answers_with_yes(yes: usize) -> Vec<Answer> {
    (0..15)
        .map(|index| Answer {
            question_index: index,
            value: AnswerValue::from(index < yes),
        })
        .collect()
}

pub(super) fn completed_controller(set: Arc<QuestionSet>, values: &[bool]) -> QuestionnaireController {
    let mut controller = QuestionnaireController::new(set);
    controller.start().expect("starts");
    for value in values {
        controller
            .submit_answer(AnswerValue::from(*value))
            .expect("answer accepted");
    }
    controller
}

pub(super) fn two_tier_table(scorable: u32) -> TierTable {
    TierTable::new(
        vec![tier("low", 0, 1, false), tier("high", 2, scorable, true)],
        scorable,
    )
    .expect("valid table")
}

pub(super) fn build_service() -> (
    AssessmentService<MemorySessions, MemoryStateStore>,
    Arc<MemorySessions>,
    Arc<MemoryStateStore>,
) {
    let repository = Arc::new(MemorySessions::default());
    let store = Arc::new(MemoryStateStore::default());
    let service = AssessmentService::new(
        repository.clone(),
        store.clone(),
        Arc::new(standard_resolver()),
    );
    (service, repository, store)
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    pub(super) sessions: Arc<Mutex<HashMap<AssessmentId, AssessmentSession>>>,
}

impl SessionRepository for MemorySessions {
    fn insert(&self, session: AssessmentSession) -> Result<AssessmentSession, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn modify<T, E, F>(&self, id: &AssessmentId, apply: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut AssessmentSession) -> Result<T, E>,
    {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        let outcome = apply(&mut draft)?;
        *stored = draft;
        Ok(outcome)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentSession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

/// Holds every caller of `modify` until `parties` requests have arrived, so
/// concurrent submissions reach the repository together.
pub(super) struct BarrierSessions {
    pub(super) inner: MemorySessions,
    barrier: Barrier,
}

impl BarrierSessions {
    pub(super) fn new(parties: usize) -> Self {
        Self {
            inner: MemorySessions::default(),
            barrier: Barrier::new(parties),
        }
    }
}

impl SessionRepository for BarrierSessions {
    fn insert(&self, session: AssessmentSession) -> Result<AssessmentSession, RepositoryError> {
        self.inner.insert(session)
    }

    fn modify<T, E, F>(&self, id: &AssessmentId, apply: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut AssessmentSession) -> Result<T, E>,
    {
        self.barrier.wait();
        self.inner.modify(id, apply)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentSession>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn remove(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        self.inner.remove(id)
    }
}

pub(super) struct UnavailableSessions;

impl SessionRepository for UnavailableSessions {
    fn insert(&self, _session: AssessmentSession) -> Result<AssessmentSession, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn modify<T, E, F>(&self, _id: &AssessmentId, _apply: F) -> Result<T, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut AssessmentSession) -> Result<T, E>,
    {
        Err(RepositoryError::Unavailable("session store offline".to_string()).into())
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }

    fn remove(&self, _id: &AssessmentId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("session store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: AssessmentService<MemorySessions, MemoryStateStore>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}
