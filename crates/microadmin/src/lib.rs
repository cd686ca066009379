// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Microadmin: tells every worker pod of an application to reload its
//! configuration.

pub mod broadcast;
pub mod config;
pub mod delivery;
pub mod error;
pub mod kube;
pub mod membership;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_support;

use std::sync::{Arc, Once};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::broadcast::{BroadcastSummary, Broadcaster};
use crate::config::AdminConfig;
use crate::delivery::HttpTransport;
use crate::kube::KubeClient;
use crate::membership::cluster::KubeResolver;
use crate::membership::MembershipResolver;
use crate::state::AdminState;
use crate::transport::build_router;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times; only the first call has effect.
pub fn install_crypto_provider() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Build a broadcaster over `resolver` that delivers over HTTP as configured.
pub fn build_broadcaster(
    config: &AdminConfig,
    resolver: Arc<dyn MembershipResolver>,
) -> anyhow::Result<Broadcaster> {
    install_crypto_provider();
    let transport =
        HttpTransport::new(config.member_port, config.refresh_path.clone(), config.delivery_timeout())?;
    Ok(Broadcaster::new(resolver, Arc::new(transport))
        .with_max_concurrent(config.max_concurrent_deliveries))
}

/// Connect to the cluster and build the production broadcaster.
fn connect(config: &AdminConfig) -> anyhow::Result<Broadcaster> {
    install_crypto_provider();
    let client = Arc::new(KubeClient::connect(config.kubeconfig.as_deref())?);
    let resolver = KubeResolver::new(client, config.namespace.clone(), config.label_key.clone());
    build_broadcaster(config, Arc::new(resolver))
}

/// Run the admin server until shutdown.
pub async fn run(config: AdminConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr();
    let shutdown = CancellationToken::new();

    let broadcaster = Arc::new(connect(&config)?);
    let state = Arc::new(AdminState::new(config.clone(), broadcaster));

    spawn_signal_handler(shutdown.clone());

    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    info!(
        app = %config.app,
        namespace = %config.namespace,
        "microadmin listening on {addr}"
    );
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    info!("microadmin stopped");
    Ok(())
}

/// Broadcast one refresh for `app` (or the configured default) and return
/// its summary. Errors only if the broadcast could not start.
pub async fn refresh_once(config: &AdminConfig, app: Option<&str>) -> anyhow::Result<BroadcastSummary> {
    let broadcaster = connect(config)?;
    let app = app.unwrap_or(&config.app);
    let result = broadcaster.broadcast(app).await?;
    Ok(result.summary())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
            }
        }
        shutdown.cancel();
    });
}
