// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// Tells the worker pods of an application to reload their configuration.
#[derive(Debug, Parser)]
#[command(name = "microadmin", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub config: AdminConfig,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the admin HTTP API (default).
    Serve,
    /// Broadcast one refresh and print the summary as JSON.
    Refresh {
        /// Application to refresh. Defaults to `--app`.
        app: Option<String>,
    },
}

/// Configuration for the microadmin service.
#[derive(Debug, Clone, clap::Args)]
pub struct AdminConfig {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "MICROADMIN_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "MICROADMIN_PORT")]
    pub port: u16,

    /// Application refreshed when a trigger does not name one.
    #[arg(long, default_value = "producer", env = "MICROADMIN_APP")]
    pub app: String,

    /// Namespace the worker pods live in.
    #[arg(long, default_value = "default", env = "MICROADMIN_NAMESPACE")]
    pub namespace: String,

    /// Pod label whose value is the application name.
    #[arg(long, default_value = "app", env = "MICROADMIN_LABEL_KEY")]
    pub label_key: String,

    /// Port the workers serve their refresh route on.
    #[arg(long, default_value_t = 8081, env = "MICROADMIN_MEMBER_PORT")]
    pub member_port: u16,

    /// Route on each worker that triggers a configuration reload.
    #[arg(long, default_value = "/refresh-config", env = "MICROADMIN_REFRESH_PATH")]
    pub refresh_path: String,

    /// Per-delivery timeout in milliseconds.
    #[arg(long, default_value_t = 10000, env = "MICROADMIN_DELIVERY_TIMEOUT_MS")]
    pub delivery_timeout_ms: u64,

    /// Maximum deliveries in flight for one broadcast (1 = sequential).
    #[arg(long, default_value_t = 8, env = "MICROADMIN_MAX_CONCURRENT_DELIVERIES")]
    pub max_concurrent_deliveries: usize,

    /// Path to a kubeconfig file. Falls back to in-cluster credentials.
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Bearer token for the admin API. If unset, auth is disabled.
    #[arg(long, env = "MICROADMIN_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Log format (text or json).
    #[arg(long, default_value = "text", env = "MICROADMIN_LOG_FORMAT")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "MICROADMIN_LOG_LEVEL")]
    pub log_level: String,
}

impl AdminConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.refresh_path.is_empty() {
            anyhow::bail!("--refresh-path must not be empty");
        }
        if !self.refresh_path.starts_with('/') {
            anyhow::bail!("--refresh-path must start with '/': {}", self.refresh_path);
        }
        if self.max_concurrent_deliveries == 0 {
            anyhow::bail!("--max-concurrent-deliveries must be at least 1");
        }
        if self.delivery_timeout_ms == 0 {
            anyhow::bail!("--delivery-timeout-ms must be greater than 0");
        }
        if self.label_key.is_empty() {
            anyhow::bail!("--label-key must not be empty");
        }
        match self.log_format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        Ok(())
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
