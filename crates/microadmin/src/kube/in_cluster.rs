// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-cluster configuration from the pod's mounted service account.

use std::path::Path;

use anyhow::Context;

use super::{ClusterAuth, ClusterConfig};

/// Where Kubernetes mounts the service account token and CA bundle.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Load in-cluster settings from the process environment.
pub fn load() -> anyhow::Result<ClusterConfig> {
    load_with(|k| std::env::var(k).ok(), Path::new(SERVICE_ACCOUNT_DIR))
}

/// Load in-cluster settings from an env lookup and a service account dir.
pub fn load_with(
    env: impl Fn(&str) -> Option<String>,
    service_account_dir: &Path,
) -> anyhow::Result<ClusterConfig> {
    let host = env("KUBERNETES_SERVICE_HOST")
        .filter(|h| !h.is_empty())
        .context("KUBERNETES_SERVICE_HOST is not set (not running in a cluster?)")?;
    let port = env("KUBERNETES_SERVICE_PORT").filter(|p| !p.is_empty()).unwrap_or_else(|| "443".into());
    let host = if host.contains(':') { format!("[{host}]") } else { host };

    let token_path = service_account_dir.join("token");
    let token = std::fs::read_to_string(&token_path)
        .with_context(|| format!("failed to read {}", token_path.display()))?;
    let ca_path = service_account_dir.join("ca.crt");
    let ca_pem =
        std::fs::read(&ca_path).with_context(|| format!("failed to read {}", ca_path.display()))?;

    Ok(ClusterConfig {
        server: format!("https://{host}:{port}"),
        ca_pem: Some(ca_pem),
        insecure: false,
        auth: ClusterAuth::Bearer(token.trim().to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect();
        move |name: &str| map.get(name).cloned()
    }

    fn service_account() -> anyhow::Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("token"), "sa-token\n")?;
        std::fs::write(dir.path().join("ca.crt"), "CA")?;
        Ok(dir)
    }

    #[test]
    fn builds_https_server_from_env() -> anyhow::Result<()> {
        let dir = service_account()?;
        let env = env_from(&[
            ("KUBERNETES_SERVICE_HOST", "10.96.0.1"),
            ("KUBERNETES_SERVICE_PORT", "6443"),
        ]);
        let config = load_with(env, dir.path())?;
        assert_eq!(config.server, "https://10.96.0.1:6443");
        assert_eq!(config.auth, ClusterAuth::Bearer("sa-token".into()));
        assert_eq!(config.ca_pem.as_deref(), Some(&b"CA"[..]));
        assert!(!config.insecure);
        Ok(())
    }

    #[test]
    fn ipv6_host_is_bracketed_and_port_defaults() -> anyhow::Result<()> {
        let dir = service_account()?;
        let env = env_from(&[("KUBERNETES_SERVICE_HOST", "fd00::1")]);
        let config = load_with(env, dir.path())?;
        assert_eq!(config.server, "https://[fd00::1]:443");
        Ok(())
    }

    #[test]
    fn fails_outside_cluster() -> anyhow::Result<()> {
        let dir = service_account()?;
        assert!(load_with(env_from(&[]), dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn fails_without_token() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let env = env_from(&[("KUBERNETES_SERVICE_HOST", "10.96.0.1")]);
        assert!(load_with(env, dir.path()).is_err());
        Ok(())
    }
}
