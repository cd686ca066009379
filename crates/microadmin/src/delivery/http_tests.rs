// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;

use super::*;
use crate::test_support::spawn_server;

async fn refresh(State(hits): State<Arc<AtomicU32>>, headers: HeaderMap) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    match headers.get("content-type").and_then(|v| v.to_str().ok()) {
        Some("application/json") => StatusCode::OK,
        _ => StatusCode::UNSUPPORTED_MEDIA_TYPE,
    }
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

/// Fake worker: `/refresh-config` succeeds, `/broken` fails, `/slow` stalls.
async fn worker(hits: Arc<AtomicU32>) -> anyhow::Result<std::net::SocketAddr> {
    let router = Router::new()
        .route("/refresh-config", post(refresh))
        .route("/broken", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/slow", post(slow))
        .with_state(hits);
    spawn_server(router).await
}

fn transport(port: u16, path: &str, timeout: Duration) -> anyhow::Result<HttpTransport> {
    crate::install_crypto_provider();
    HttpTransport::new(port, path, timeout)
}

#[test]
fn url_formats_ipv4_and_ipv6() -> anyhow::Result<()> {
    let t = transport(8081, "/refresh-config", Duration::from_secs(1))?;
    assert_eq!(t.url("10.0.0.1"), "http://10.0.0.1:8081/refresh-config");
    assert_eq!(t.url("fd00::1"), "http://[fd00::1]:8081/refresh-config");
    assert_eq!(t.url("[fd00::1]"), "http://[fd00::1]:8081/refresh-config");
    Ok(())
}

#[tokio::test]
async fn success_status_is_delivered() -> anyhow::Result<()> {
    let hits = Arc::new(AtomicU32::new(0));
    let addr = worker(Arc::clone(&hits)).await?;
    let t = transport(addr.port(), "/refresh-config", Duration::from_secs(5))?;

    t.deliver("127.0.0.1", RefreshCommand).await?;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn error_status_is_reported() -> anyhow::Result<()> {
    let addr = worker(Arc::new(AtomicU32::new(0))).await?;
    let t = transport(addr.port(), "/broken", Duration::from_secs(5))?;

    let result = t.deliver("127.0.0.1", RefreshCommand).await;
    assert_eq!(result, Err(DeliveryError::Status(500)));
    Ok(())
}

#[tokio::test]
async fn missing_route_is_reported() -> anyhow::Result<()> {
    let addr = worker(Arc::new(AtomicU32::new(0))).await?;
    let t = transport(addr.port(), "/nope", Duration::from_secs(5))?;

    let result = t.deliver("127.0.0.1", RefreshCommand).await;
    assert_eq!(result, Err(DeliveryError::Status(404)));
    Ok(())
}

#[tokio::test]
async fn connection_refused_is_transport_error() -> anyhow::Result<()> {
    let t = transport(1, "/refresh-config", Duration::from_secs(5))?;
    let result = t.deliver("127.0.0.1", RefreshCommand).await;
    assert!(matches!(result, Err(DeliveryError::Transport(_))), "{result:?}");
    Ok(())
}

#[tokio::test]
async fn slow_member_times_out() -> anyhow::Result<()> {
    let addr = worker(Arc::new(AtomicU32::new(0))).await?;
    let t = transport(addr.port(), "/slow", Duration::from_millis(200))?;

    let result = t.deliver("127.0.0.1", RefreshCommand).await;
    match result {
        Err(DeliveryError::Transport(msg)) => assert!(msg.contains("timed out"), "{msg}"),
        other => anyhow::bail!("expected timeout, got {other:?}"),
    }
    Ok(())
}

#[test]
fn error_display() {
    assert_eq!(DeliveryError::Status(503).to_string(), "unexpected status code 503");
    assert_eq!(
        DeliveryError::Transport("connection refused".into()).to_string(),
        "transport error: connection refused"
    );
}
