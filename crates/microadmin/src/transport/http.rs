// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the admin API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::broadcast::{BroadcastError, Verdict};
use crate::error::AdminError;
use crate::state::AdminState;

/// Header naming the application to refresh.
pub const APP_HEADER: &str = "x-app-name";

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub default_app: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub app: Option<String>,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AdminState>>) -> impl IntoResponse {
    Json(HealthResponse { status: "running".to_owned(), default_app: s.config.app.clone() })
}

/// `POST /refresh-config`: refresh one application, plain-text answer.
///
/// The application comes from the `X-App-Name` header, then `?app=`, then
/// the configured default. Names are used exactly as sent; an empty value
/// counts as absent.
pub async fn refresh_config(
    State(s): State<Arc<AdminState>>,
    headers: HeaderMap,
    Query(query): Query<RefreshQuery>,
) -> impl IntoResponse {
    let from_header = headers
        .get(APP_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|a| !a.is_empty())
        .map(str::to_owned);
    let from_query = query.app.filter(|a| !a.is_empty());
    let app = from_header.or(from_query).unwrap_or_else(|| s.config.app.clone());

    match s.routes.refresh_config(&app).await {
        Ok(result) if result.is_success() => (StatusCode::OK, "OK".to_owned()).into_response(),
        Ok(result) => {
            (StatusCode::INTERNAL_SERVER_ERROR, result.failure_message()).into_response()
        }
        Err(e) => {
            let status = match e {
                BroadcastError::EmptyApplication => StatusCode::BAD_REQUEST,
                BroadcastError::Discovery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string()).into_response()
        }
    }
}

/// `POST /api/v1/apps/{app}/refresh`: refresh one application, JSON summary.
pub async fn refresh_app(
    State(s): State<Arc<AdminState>>,
    Path(app): Path<String>,
) -> impl IntoResponse {
    match s.routes.refresh_app(&app).await {
        Ok(summary) if summary.verdict == Verdict::Success => Json(summary).into_response(),
        Ok(summary) => (AdminError::RefreshFailed.status_code(), Json(summary)).into_response(),
        Err(e) => e.code().to_http_response(e.to_string()).into_response(),
    }
}
