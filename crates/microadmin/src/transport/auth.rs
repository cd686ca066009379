// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AdminError;
use crate::state::AdminState;

/// Routes reachable without a token.
const OPEN_PATHS: &[&str] = &["/api/v1/health"];

/// Compare two tokens without short-circuiting on the first differing byte.
fn tokens_match(presented: &[u8], expected: &[u8]) -> bool {
    presented.len() == expected.len()
        && presented.iter().zip(expected).fold(0u8, |diff, (p, e)| diff | (p ^ e)) == 0
}

/// The token of an `Authorization: Bearer <token>` header, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Check the request's bearer token against `expected`. No expected token
/// means auth is disabled.
pub fn validate_bearer(headers: &HeaderMap, expected: Option<&str>) -> Result<(), AdminError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    match bearer_token(headers) {
        Some(token) if tokens_match(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(AdminError::Unauthorized),
    }
}

/// Rejects refresh triggers that lack the configured admin token.
pub async fn auth_layer(
    State(state): State<Arc<AdminState>>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if OPEN_PATHS.contains(&path) {
        return next.run(req).await;
    }

    if let Err(code) = validate_bearer(req.headers(), state.config.auth_token.as_deref()) {
        tracing::debug!(path, "rejected refresh trigger without valid token");
        return code.to_http_response("unauthorized").into_response();
    }

    next.run(req).await
}
