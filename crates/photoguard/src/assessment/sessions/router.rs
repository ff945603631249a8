use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::repository::{AssessmentId, RepositoryError, SessionRepository};
use super::service::{AssessmentService, AssessmentServiceError};
use crate::assessment::controller::QuestionnaireError;
use crate::assessment::domain::AnswerValue;
use crate::assessment::triage::MEDICAL_WARNING;
use crate::store::StateStore;

/// Body accepted by the answer endpoint. `value` is interpreted per question kind.
#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    #[serde(default)]
    pub value: Value,
}

/// Router builder exposing the questionnaire and triage endpoints.
pub fn assessment_router<R, S>(service: Arc<AssessmentService<R, S>>) -> Router
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(start_handler::<R, S>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(status_handler::<R, S>).delete(close_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/answers",
            post(answer_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/reset",
            post(reset_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/start",
            post(restart_handler::<R, S>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/result",
            get(result_handler::<R, S>),
        )
        .route("/api/v1/tiers", get(tiers_handler::<R, S>))
        .with_state(service)
}

pub(crate) async fn start_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
) -> Response
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    match service.start() {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    match service.current(&AssessmentId(assessment_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answer_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(assessment_id): Path<String>,
    axum::Json(submission): axum::Json<AnswerSubmission>,
) -> Response
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    let value = match AnswerValue::from_json(&submission.value) {
        Ok(value) => value,
        Err(error) => return error_response(error.into()),
    };

    match service.submit(&AssessmentId(assessment_id), value) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reset_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    match service.reset(&AssessmentId(assessment_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn restart_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    match service.restart(&AssessmentId(assessment_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn result_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    match service.result(&AssessmentId(assessment_id.clone())) {
        Ok(result) => {
            let payload = json!({
                "assessment_id": assessment_id,
                "yes_count": result.yes_count,
                "scorable_count": result.scorable_count,
                "range": result.tier.range_label(),
                "tier": result.tier,
                "medical_warning": MEDICAL_WARNING,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn close_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    match service.close(&AssessmentId(assessment_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn tiers_handler<R, S>(
    State(service): State<Arc<AssessmentService<R, S>>>,
) -> Response
where
    R: SessionRepository + 'static,
    S: StateStore + 'static,
{
    let payload = json!({ "tiers": service.tiers() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Questionnaire(
            QuestionnaireError::AlreadyInProgress | QuestionnaireError::InvalidState { .. },
        ) => StatusCode::CONFLICT,
        AssessmentServiceError::Questionnaire(QuestionnaireError::InvalidAnswer { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
