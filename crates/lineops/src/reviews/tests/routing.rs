use super::common::*;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::reviews::router::{
    access_handler, gate_handler, submit_handler, AccessRequest, GateParams,
};
use crate::reviews::service::ReviewService;
use crate::reviews::{review_router, EngineConfig, EmployeeId, ShiftType};

fn unavailable_service() -> Arc<
    ReviewService<UnavailableRepository, MemoryCatalog, MemoryStaff, MemoryAlerts>,
> {
    Arc::new(ReviewService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryCatalog::default()),
        Arc::new(MemoryStaff::default()),
        Arc::new(MemoryAlerts::default()),
        engine_config(),
    ))
}

#[tokio::test]
async fn submit_handler_reports_conflict_when_window_expired() {
    let config = EngineConfig {
        update_window_hours: 0,
        ..engine_config()
    };
    let (service, _, _) = build_service(config);

    let first = submit_handler(
        State(service.clone()),
        axum::Json(submission(&[("clean", 5), ("prep", 5), ("safety", 5)])),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = submit_handler(
        State(service),
        axum::Json(submission(&[("prep", 4)])),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = axum::body::to_bytes(second.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let payload: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(payload["reason"], "update_window_expired");
}

#[tokio::test]
async fn submit_handler_rejects_out_of_range_ratings() {
    let (service, _, _) = build_service(engine_config());

    let response = submit_handler(
        State(service),
        axum::Json(submission(&[("clean", 9)])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_repository_failure() {
    let response = submit_handler(
        State(unavailable_service()),
        axum::Json(submission(&[("clean", 5)])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn access_handler_denies_unknown_staff_without_erroring() {
    let (service, _, _) = build_service(engine_config());

    let response = access_handler(
        State(service),
        axum::Json(AccessRequest {
            employee_id: EmployeeId("ghost".to_string()),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let payload: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(payload["granted"], false);
}

#[tokio::test]
async fn gate_handler_admits_unconfigured_departments() {
    let (service, _, _) = build_service(engine_config());

    let response = gate_handler(
        State(service),
        Query(GateParams {
            employee_id: EmployeeId("emp-1".to_string()),
            department: "patio".to_string(),
            shift: ShiftType::Closing,
            date: Some(review_date()),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let payload: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(payload["workflow_allowed"], true);
}

#[tokio::test]
async fn submit_route_accepts_payloads() {
    let (service, _, _) = build_service(engine_config());
    let router = review_router(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/reviews")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&submission(&[
                        ("clean", 5),
                        ("prep", 4),
                        ("safety", 1),
                    ]))
                    .expect("serializable"),
                ))
                .expect("valid request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let payload: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(payload["total_score"], 10);
    assert_eq!(payload["max_possible_score"], 15);
    assert_eq!(payload["requires_manager_followup"], true);
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_template() {
    let (service, _, _) = build_service(engine_config());
    let router = review_router(service);

    let response = router
        .oneshot(
            axum::http::Request::get(
                "/api/v1/reviews/status?template_id=tpl-unlisted&employee_id=emp-1&date=2024-01-10&shift=opening",
            )
            .body(axum::body::Body::empty())
            .expect("valid request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
