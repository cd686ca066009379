// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;

use super::AdminError;

#[yare::parameterized(
    unauthorized = { AdminError::Unauthorized, StatusCode::UNAUTHORIZED, "UNAUTHORIZED" },
    bad_request = { AdminError::BadRequest, StatusCode::BAD_REQUEST, "BAD_REQUEST" },
    discovery = { AdminError::DiscoveryFailed, StatusCode::SERVICE_UNAVAILABLE, "DISCOVERY_FAILED" },
    refresh = { AdminError::RefreshFailed, StatusCode::BAD_GATEWAY, "REFRESH_FAILED" },
)]
fn status_and_code(err: AdminError, status: StatusCode, code: &str) {
    let (got, body) = err.to_http_response("boom");
    assert_eq!(got, status);
    assert_eq!(body.error.code, code);
    assert_eq!(body.error.message, "boom");
    assert_eq!(err.to_string(), code);
}
