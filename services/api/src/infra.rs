use metrics_exporter_prometheus::PrometheusHandle;
use photoguard::assessment::{AssessmentId, AssessmentSession, RepositoryError, SessionRepository};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<AssessmentId, AssessmentSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
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
        let Some(stored) = guard.get_mut(id) else {
            return Err(RepositoryError::NotFound.into());
        };
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
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Parses a scripted answer string such as `yynny` or `1,0,1`.
pub(crate) fn parse_answer_script(raw: &str) -> Result<Vec<bool>, String> {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c.to_ascii_lowercase() {
            'y' | '1' | 't' => Ok(true),
            'n' | '0' | 'f' => Ok(false),
            other => Err(format!("unrecognized answer '{other}' (use y/n)")),
        })
        .collect()
}
