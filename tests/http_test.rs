//! End-to-end tests for the HTTP surface, driven through the router.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use parsort::http::SortResponse;
use parsort::sorter::{CoordinatorConfig, WorkerPoolConfig};
use parsort::{Runtime, RuntimeConfig};
use serde_json::Value;
use tower::ServiceExt;

fn runtime_with(max_body_bytes: usize) -> Runtime {
    runtime_with_pool(WorkerPoolConfig::with_threads(2), max_body_bytes)
}

fn runtime_with_pool(pool: WorkerPoolConfig, max_body_bytes: usize) -> Runtime {
    Runtime::new(RuntimeConfig {
        coordinator: CoordinatorConfig {
            pool,
            sort_timeout: Duration::from_secs(10),
        },
        max_body_bytes,
        shutdown_timeout: Duration::from_secs(1),
    })
    .expect("runtime should start")
}

fn runtime() -> Runtime {
    runtime_with(1024 * 1024)
}

async fn post(app: Router, path: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

async fn get(app: Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ============================================================================
// Sort endpoints
// ============================================================================

#[tokio::test]
async fn test_process_single_sorts_every_array() {
    let rt = runtime();
    let (status, body) = post(
        rt.router(),
        "/process-single",
        r#"{"to_sort": [[3,1,2],[5,4],[]]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let resp: SortResponse = serde_json::from_value(body).unwrap();
    assert_eq!(resp.sorted_arrays, vec![vec![1, 2, 3], vec![4, 5], vec![]]);
    assert!(resp.time_ns >= 0);
}

#[tokio::test]
async fn test_process_concurrent_sorts_every_array() {
    let rt = runtime();
    let (status, body) = post(
        rt.router(),
        "/process-concurrent",
        r#"{"to_sort": [[3,1,2],[5,4],[]]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sorted_arrays"], serde_json::json!([[1, 2, 3], [4, 5], []]));
    assert!(body["time_ns"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_empty_batch_returns_empty_list() {
    let rt = runtime();
    for path in ["/process-single", "/process-concurrent"] {
        let (status, body) = post(rt.router(), path, r#"{"to_sort": []}"#).await;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert_eq!(body["sorted_arrays"], serde_json::json!([]));
    }
}

#[tokio::test]
async fn test_content_type_is_not_required() {
    let rt = runtime();
    let request = Request::builder()
        .method("POST")
        .uri("/process-single")
        .body(Body::from(r#"{"to_sort": [[2,1]]}"#))
        .unwrap();
    let (status, body) = send(rt.router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sorted_arrays"], serde_json::json!([[1, 2]]));
}

#[tokio::test]
async fn test_response_is_json() {
    let rt = runtime();
    let request = Request::builder()
        .method("POST")
        .uri("/process-concurrent")
        .body(Body::from(r#"{"to_sort": [[1]]}"#))
        .unwrap();
    let response = rt.router().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let rt = runtime();
    for path in ["/process-single", "/process-concurrent"] {
        let (status, body) = post(rt.router(), path, "not-json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["error"]["type"], "invalid_payload");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON payload"));
    }
}

#[tokio::test]
async fn test_wrong_shapes_are_bad_request() {
    let rt = runtime();
    for payload in [
        "{}",
        r#"{"to_sort": null}"#,
        r#"{"to_sort": [1, 2, 3]}"#,
        r#"{"to_sort": [["x"]]}"#,
        r#"{"to_sort": [[1.25]]}"#,
    ] {
        let (status, _) = post(rt.router(), "/process-concurrent", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
    }
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let rt = runtime_with(1024);
    let big: Vec<i64> = (0..2_000).collect();
    let payload = serde_json::json!({ "to_sort": [big] }).to_string();

    let (status, _) = post(rt.router(), "/process-single", payload).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let rt = runtime();
    let (status, _) = get(rt.router(), "/process-single").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_draining_rejects_new_sorts() {
    let rt = runtime();
    let _ = rt.shutdown.initiate(Duration::from_millis(10)).await;

    let (status, body) = post(rt.router(), "/process-single", r#"{"to_sort": [[1]]}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "shutting_down");
}

#[tokio::test]
async fn test_batch_larger_than_queue_capacity_is_sorted() {
    let rt = runtime_with_pool(
        WorkerPoolConfig {
            queue_capacity: 2,
            ..WorkerPoolConfig::with_threads(1)
        },
        1024 * 1024,
    );
    let (status, body) = post(
        rt.router(),
        "/process-concurrent",
        r#"{"to_sort": [[3,1],[2],[9,8,7],[],[5,4]]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["sorted_arrays"],
        serde_json::json!([[1, 3], [2], [7, 8, 9], [], [4, 5]])
    );
}

#[tokio::test]
async fn test_stopped_pool_returns_service_unavailable() {
    let rt = runtime();
    rt.coordinator.shutdown();

    let (status, body) = post(rt.router(), "/process-concurrent", r#"{"to_sort": [[2,1]]}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "pool_shutdown");
}

// ============================================================================
// Health and metrics
// ============================================================================

#[tokio::test]
async fn test_health_endpoints_when_running() {
    let rt = runtime();

    let (status, body) = get(rt.router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "healthy");
    assert_eq!(body["workers"], 2);

    let (status, body) = get(rt.router(), "/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = get(rt.router(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_ready_fails_while_draining() {
    let rt = runtime();
    let _ = rt.shutdown.initiate(Duration::from_millis(10)).await;

    let (status, _) = get(rt.router(), "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Liveness is unaffected.
    let (status, _) = get(rt.router(), "/live").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ready_tracks_configured_queue_capacity() {
    let rt = runtime_with_pool(
        WorkerPoolConfig {
            queue_capacity: 2,
            ..WorkerPoolConfig::with_threads(1)
        },
        1024 * 1024,
    );
    let pool = rt.coordinator.pool().clone();

    // Park the worker and fill the queue.
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
    pool.submit(Box::new(move || {
        started_tx.send(()).unwrap();
        let _ = release_rx.recv_timeout(Duration::from_secs(5));
    }))
    .unwrap();
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    pool.submit(Box::new(|| {})).unwrap();
    pool.submit(Box::new(|| {})).unwrap();

    let (status, body) = post(rt.router(), "/process-concurrent", r#"{"to_sort": [[2,1]]}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "queue_full");

    let (status, _) = get(rt.router(), "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, body) = get(rt.router(), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["state"], "degraded");

    release_tx.send(()).unwrap();
    let mut ready = false;
    for _ in 0..500 {
        if get(rt.router(), "/ready").await.0 == StatusCode::OK {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(ready, "service should become ready once the backlog drains");
}

#[tokio::test]
async fn test_metrics_reflect_sorted_batches() {
    let rt = runtime();
    let (status, _) = post(
        rt.router(),
        "/process-concurrent",
        r#"{"to_sort": [[3,1,2],[5,4]]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(rt.router(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pool"]["workers"], 2);
    assert!(body["counters"]["parsort_batches_total.concurrent"].as_u64().unwrap() >= 1);
    assert!(body["histograms"]["parsort_sort_duration_ns.concurrent"]["count"]
        .as_u64()
        .unwrap()
        >= 1);
}
