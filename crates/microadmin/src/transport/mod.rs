// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP trigger surface for the admin service.

pub mod auth;
pub mod http;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::broadcast::{BroadcastError, BroadcastResult, BroadcastSummary, Broadcaster};
use crate::state::AdminState;

/// One method per refresh route. The router dispatches to this instead of
/// to free-standing closures, so the route table is explicit.
pub trait RefreshRoutes: Send + Sync {
    /// `POST /refresh-config`
    fn refresh_config<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<BroadcastResult, BroadcastError>>;

    /// `POST /api/v1/apps/{app}/refresh`
    fn refresh_app<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<BroadcastSummary, BroadcastError>>;
}

impl RefreshRoutes for Broadcaster {
    fn refresh_config<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<BroadcastResult, BroadcastError>> {
        self.broadcast(application).boxed()
    }

    fn refresh_app<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<BroadcastSummary, BroadcastError>> {
        async move { self.broadcast(application).await.map(|r| r.summary()) }.boxed()
    }
}

/// Build the axum `Router` with all admin routes.
pub fn build_router(state: Arc<AdminState>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(http::health))
        // Refresh triggers
        .route("/refresh-config", post(http::refresh_config))
        .route("/api/v1/apps/{app}/refresh", post(http::refresh_app))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
