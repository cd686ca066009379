// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal Kubernetes API client: just enough to list the pods behind an
//! application label.
//!
//! The client is built once at startup and shared by reference. Connection
//! settings come from a kubeconfig file when one is readable, otherwise from
//! the pod's own service account (in-cluster).

pub mod in_cluster;
pub mod kubeconfig;
pub mod pod;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use self::pod::PodList;

/// Timeout for API server requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved connection settings for one API server.
#[derive(Clone)]
pub struct ClusterConfig {
    /// API server base URL, without a trailing slash.
    pub server: String,
    /// PEM bundle of extra trust roots for the API server.
    pub ca_pem: Option<Vec<u8>>,
    /// Skip server certificate verification.
    pub insecure: bool,
    pub auth: ClusterAuth,
}

/// How requests authenticate to the API server.
#[derive(Clone, PartialEq, Eq)]
pub enum ClusterAuth {
    None,
    Bearer(String),
    Basic { username: String, password: Option<String> },
    /// PEM containing the client certificate followed by its private key.
    ClientCert(Vec<u8>),
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("server", &self.server)
            .field("ca_pem", &self.ca_pem.as_ref().map(|p| p.len()))
            .field("insecure", &self.insecure)
            .field("auth", &self.auth)
            .finish()
    }
}

impl fmt::Debug for ClusterAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secrets.
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer(_) => f.write_str("Bearer(..)"),
            Self::Basic { username, .. } => write!(f, "Basic({username})"),
            Self::ClientCert(_) => f.write_str("ClientCert(..)"),
        }
    }
}

impl ClusterConfig {
    /// Locate cluster settings: the kubeconfig file first (explicit path,
    /// then `$KUBECONFIG`, then `~/.kube/config`), then in-cluster.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| kubeconfig::default_path_with(|k| std::env::var(k).ok()));

        let file_err = match path {
            Some(path) => match kubeconfig::load(&path) {
                Ok(config) => {
                    info!(path = %path.display(), server = %config.server, "loaded kubeconfig");
                    return Ok(config);
                }
                Err(e) => {
                    info!(
                        path = %path.display(),
                        err = %format!("{e:#}"),
                        "kubeconfig unavailable, trying in-cluster config"
                    );
                    e
                }
            },
            None => anyhow::anyhow!("no kubeconfig path"),
        };

        match in_cluster::load() {
            Ok(config) => {
                info!(server = %config.server, "using in-cluster service account");
                Ok(config)
            }
            Err(e) => {
                anyhow::bail!("no cluster configuration: kubeconfig: {file_err:#}; in-cluster: {e:#}")
            }
        }
    }
}

/// `Status` object returned by the API server on errors.
#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: Option<String>,
}

/// Shared handle to one Kubernetes API server.
pub struct KubeClient {
    server: String,
    auth: ClusterAuth,
    client: reqwest::Client,
}

impl KubeClient {
    /// Discover cluster settings and build a client for them.
    pub fn connect(kubeconfig: Option<&Path>) -> anyhow::Result<Self> {
        Self::from_config(ClusterConfig::discover(kubeconfig)?)
    }

    pub fn from_config(config: ClusterConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(ref pem) = config.ca_pem {
            for cert in reqwest::Certificate::from_pem_bundle(pem)? {
                builder = builder.add_root_certificate(cert);
            }
        }
        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let ClusterAuth::ClientCert(ref pem) = config.auth {
            builder = builder.identity(reqwest::Identity::from_pem(pem)?);
        }
        let client = builder.build()?;
        let server = config.server.trim_end_matches('/').to_owned();
        Ok(Self { server, auth: config.auth, client })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            ClusterAuth::Bearer(token) => req.bearer_auth(token),
            ClusterAuth::Basic { username, password } => req.basic_auth(username, password.as_ref()),
            ClusterAuth::None | ClusterAuth::ClientCert(_) => req,
        }
    }

    /// List pods in `namespace` matching `label_selector`.
    pub async fn list_pods(&self, namespace: &str, label_selector: &str) -> anyhow::Result<PodList> {
        let url = format!("{}/api/v1/namespaces/{namespace}/pods", self.server);
        debug!(%url, label_selector, "listing pods");
        let req = self.client.get(url).query(&[("labelSelector", label_selector)]);
        let resp = self.apply_auth(req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiStatus>(&body)
                .ok()
                .and_then(|s| s.message)
                .unwrap_or(body);
            anyhow::bail!("list pods in {namespace} failed ({status}): {message}");
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
