// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::transport::RefreshRoutes;

/// Shared admin API state.
///
/// Holds no per-invocation data: every refresh resolves and delivers afresh,
/// so concurrent requests never contend on anything here.
pub struct AdminState {
    pub config: AdminConfig,
    pub routes: Arc<dyn RefreshRoutes>,
}

impl AdminState {
    pub fn new(config: AdminConfig, routes: Arc<dyn RefreshRoutes>) -> Self {
        Self { config, routes }
    }
}
