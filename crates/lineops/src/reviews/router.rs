use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::catalog::TemplateCatalog;
use super::domain::{EmployeeId, InstanceKey, ReviewSubmission, ShiftType, TemplateId};
use super::repository::{NotificationPublisher, ReviewRepository, StaffDirectory};
use super::service::{ReviewService, ReviewServiceError};

/// Router builder exposing the engine's HTTP operations.
pub fn review_router<R, C, S, N>(service: Arc<ReviewService<R, C, S, N>>) -> Router
where
    R: ReviewRepository + 'static,
    C: TemplateCatalog + 'static,
    S: StaffDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/reviews/access", post(access_handler::<R, C, S, N>))
        .route("/api/v1/reviews/status", get(status_handler::<R, C, S, N>))
        .route("/api/v1/reviews", post(submit_handler::<R, C, S, N>))
        .route(
            "/api/v1/workflow/requirements",
            get(gate_handler::<R, C, S, N>),
        )
        .route(
            "/api/v1/reviews/daily/:employee_id",
            get(daily_handler::<R, C, S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessRequest {
    pub(crate) employee_id: EmployeeId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusParams {
    pub(crate) template_id: TemplateId,
    pub(crate) employee_id: EmployeeId,
    pub(crate) date: NaiveDate,
    pub(crate) shift: ShiftType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GateParams {
    pub(crate) employee_id: EmployeeId,
    pub(crate) department: String,
    pub(crate) shift: ShiftType,
    /// Defaults to the local calendar date; overridable for testing.
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DayParams {
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
}

pub(crate) async fn access_handler<R, C, S, N>(
    State(service): State<Arc<ReviewService<R, C, S, N>>>,
    axum::Json(request): axum::Json<AccessRequest>,
) -> Response
where
    R: ReviewRepository + 'static,
    C: TemplateCatalog + 'static,
    S: StaffDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.authorize_access(&request.employee_id) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn status_handler<R, C, S, N>(
    State(service): State<Arc<ReviewService<R, C, S, N>>>,
    Query(params): Query<StatusParams>,
) -> Response
where
    R: ReviewRepository + 'static,
    C: TemplateCatalog + 'static,
    S: StaffDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let key = InstanceKey {
        template_id: params.template_id,
        employee_id: params.employee_id,
        date: params.date,
        shift: params.shift,
    };

    match service.review_status(&key, Utc::now()) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err @ ReviewServiceError::UnknownTemplate(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn submit_handler<R, C, S, N>(
    State(service): State<Arc<ReviewService<R, C, S, N>>>,
    axum::Json(submission): axum::Json<ReviewSubmission>,
) -> Response
where
    R: ReviewRepository + 'static,
    C: TemplateCatalog + 'static,
    S: StaffDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit(submission, Utc::now()) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(ReviewServiceError::WindowExpired(err)) => {
            let payload = json!({
                "error": err.to_string(),
                "reason": "update_window_expired",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(err @ ReviewServiceError::UnknownTemplate(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(
            err @ (ReviewServiceError::RatingOutOfRange { .. }
            | ReviewServiceError::UnknownCategory { .. }),
        ) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn gate_handler<R, C, S, N>(
    State(service): State<Arc<ReviewService<R, C, S, N>>>,
    Query(params): Query<GateParams>,
) -> Response
where
    R: ReviewRepository + 'static,
    C: TemplateCatalog + 'static,
    S: StaffDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    match service.check_workflow_requirements(
        &params.employee_id,
        &params.department,
        params.shift,
        date,
    ) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn daily_handler<R, C, S, N>(
    State(service): State<Arc<ReviewService<R, C, S, N>>>,
    Path(employee_id): Path<String>,
    Query(params): Query<DayParams>,
) -> Response
where
    R: ReviewRepository + 'static,
    C: TemplateCatalog + 'static,
    S: StaffDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    match service.daily_overview(&EmployeeId(employee_id), date) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => internal_error(err),
    }
}

fn internal_error(err: ReviewServiceError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
