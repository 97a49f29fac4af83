// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for http.rs

use crate::constants::{HEALTHZ_PATH, METRICS_SERVER_PATH, READYZ_PATH};
use crate::http::{health_router, metrics_router, serve, Readiness};
use crate::metrics;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

async fn get(router: Router, path: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_metrics_endpoint_serves_registry() {
    metrics::record_integration_skipped("http-test");

    let (status, body) = get(metrics_router(), METRICS_SERVER_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("switchboard_integration_skips_total"));
    assert!(body.contains("http-test"));
}

#[tokio::test]
async fn test_healthz_is_always_ok() {
    let (status, body) = get(health_router(Readiness::new()), HEALTHZ_PATH).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_readyz_follows_readiness() {
    let readiness = Readiness::new();

    let (status, _) = get(health_router(readiness.clone()), READYZ_PATH).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    readiness.mark_ready();
    let (status, body) = get(health_router(readiness), READYZ_PATH).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (status, _) = get(health_router(Readiness::new()), METRICS_SERVER_PATH).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_serve_stops_on_shutdown() {
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(
        "health",
        "127.0.0.1:0".parse().unwrap(),
        health_router(Readiness::new()),
        shutdown.clone(),
    ));

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();

    assert!(result.is_ok());
}
