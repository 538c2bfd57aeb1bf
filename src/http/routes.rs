//! Request handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::Instrument;

use super::error::ApiError;
use super::types::{SortRequest, SortResponse};
use crate::sorter::Strategy;
use crate::state::AppState;
use crate::telemetry::{self, BatchSpan, SpanExt};

/// POST /process-single
pub async fn process_single(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    handle_sort(&state, Strategy::Sequential, body).await
}

/// POST /process-concurrent
pub async fn process_concurrent(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    handle_sort(&state, Strategy::Concurrent, body).await
}

async fn handle_sort(
    state: &AppState,
    strategy: Strategy,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let Some(_guard) = state.shutdown.track() else {
        telemetry::record_rejection("draining");
        return Err(ApiError::ShuttingDown);
    };

    let body = body.map_err(|rejection| {
        telemetry::record_rejection("body_rejected");
        ApiError::from(rejection)
    })?;

    let request = SortRequest::decode(&body).map_err(|e| {
        telemetry::record_rejection("invalid_payload");
        tracing::debug!(%strategy, error = %e, "rejected sort request");
        e
    })?;
    let batch = request.into_batch();

    let request_id = uuid::Uuid::new_v4().to_string();
    let span = BatchSpan::new(&request_id, strategy, batch.len());

    let result = state
        .coordinator
        .run(strategy, batch)
        .instrument(span.clone())
        .await;
    span.record_result(&result);
    let outcome = result?;
    span.record("time_ns", outcome.elapsed_ns());

    let response = SortResponse::from(outcome);
    let encoded = serde_json::to_vec(&response).map_err(|e| ApiError::Encoding(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        encoded,
    )
        .into_response())
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.health_report();
    let status = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

/// GET /live
pub async fn live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.health.is_alive() {
        (StatusCode::OK, Json(json!({ "status": "alive" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "dead" })),
        )
    }
}

/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready" })),
        )
    }
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pool = state.coordinator.pool_stats();
    let snapshot = telemetry::global_store().snapshot();

    Json(json!({
        "pool": {
            "workers": state.coordinator.num_workers(),
            "queue_capacity": state.coordinator.queue_capacity(),
            "queued_jobs": pool.queued_jobs,
            "threads_active": pool.threads_active,
            "threads_idle": pool.threads_idle,
            "jobs_executed": pool.jobs_executed,
            "jobs_panicked": pool.jobs_panicked,
            "avg_exec_time_us": pool.avg_exec_time_us
        },
        "requests": {
            "in_flight": state.shutdown.in_flight_count()
        },
        "sort_timeout_ms": state.coordinator.sort_timeout().as_millis() as u64,
        "counters": snapshot.counters,
        "histograms": snapshot.histograms
    }))
}
