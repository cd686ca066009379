// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubeconfig file loading (current context only).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use base64::Engine;
use serde::Deserialize;

use super::{ClusterAuth, ClusterConfig};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    #[serde(default)]
    current_context: Option<String>,
    #[serde(default)]
    contexts: Vec<Named<Context>>,
    #[serde(default)]
    clusters: Vec<Named<Cluster>>,
    #[serde(default)]
    users: Vec<Named<AuthInfo>>,
}

#[derive(Debug, Deserialize)]
struct Named<T> {
    name: String,
    #[serde(alias = "context", alias = "cluster", alias = "user")]
    value: T,
}

#[derive(Debug, Deserialize)]
struct Context {
    cluster: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster {
    server: String,
    #[serde(default)]
    certificate_authority: Option<String>,
    #[serde(default)]
    certificate_authority_data: Option<String>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AuthInfo {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    token_file: Option<String>,
    #[serde(default)]
    client_certificate: Option<String>,
    #[serde(default)]
    client_certificate_data: Option<String>,
    #[serde(default)]
    client_key: Option<String>,
    #[serde(default)]
    client_key_data: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    exec: Option<serde_yaml::Value>,
    #[serde(default, rename = "auth-provider")]
    auth_provider: Option<serde_yaml::Value>,
}

/// Default kubeconfig location: first entry of `$KUBECONFIG`, else
/// `$HOME/.kube/config`, else `$USERPROFILE/.kube/config`.
///
/// Takes an env lookup so tests don't touch the process environment.
pub fn default_path_with(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(list) = env("KUBECONFIG") {
        let separator = if cfg!(windows) { ';' } else { ':' };
        if let Some(first) = list.split(separator).find(|p| !p.is_empty()) {
            return Some(PathBuf::from(first));
        }
    }
    env("HOME")
        .or_else(|| env("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".kube").join("config"))
}

/// Load the current context of the kubeconfig at `path`.
pub fn load(path: &Path) -> anyhow::Result<ClusterConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse(&contents, base_dir).with_context(|| format!("invalid kubeconfig {}", path.display()))
}

/// Parse kubeconfig YAML. Relative file references resolve against `base_dir`.
pub fn parse(contents: &str, base_dir: &Path) -> anyhow::Result<ClusterConfig> {
    let kc: Kubeconfig = serde_yaml::from_str(contents)?;

    let current = kc.current_context.as_deref().filter(|c| !c.is_empty());
    let context = match current {
        Some(name) => find(&kc.contexts, name).with_context(|| format!("context {name:?} not found"))?,
        None => match kc.contexts.as_slice() {
            [only] => &only.value,
            _ => anyhow::bail!("current-context is not set"),
        },
    };

    let cluster = find(&kc.clusters, &context.cluster)
        .with_context(|| format!("cluster {:?} not found", context.cluster))?;
    let anonymous = AuthInfo::default();
    let user = match context.user.as_deref() {
        Some(name) => find(&kc.users, name).with_context(|| format!("user {name:?} not found"))?,
        None => &anonymous,
    };

    let ca_pem = data_or_file(
        cluster.certificate_authority_data.as_deref(),
        cluster.certificate_authority.as_deref(),
        base_dir,
    )
    .context("certificate-authority")?;

    Ok(ClusterConfig {
        server: cluster.server.trim_end_matches('/').to_owned(),
        ca_pem,
        insecure: cluster.insecure_skip_tls_verify,
        auth: auth_for(user, base_dir)?,
    })
}

fn find<'a, T>(entries: &'a [Named<T>], name: &str) -> Option<&'a T> {
    entries.iter().find(|e| e.name == name).map(|e| &e.value)
}

fn auth_for(user: &AuthInfo, base_dir: &Path) -> anyhow::Result<ClusterAuth> {
    if user.exec.is_some() || user.auth_provider.is_some() {
        anyhow::bail!("exec and auth-provider credential plugins are not supported");
    }

    if let Some(ref token) = user.token {
        return Ok(ClusterAuth::Bearer(token.trim().to_owned()));
    }
    if let Some(ref file) = user.token_file {
        let path = resolve(base_dir, file);
        let token = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read token file {}", path.display()))?;
        return Ok(ClusterAuth::Bearer(token.trim().to_owned()));
    }

    let cert = data_or_file(
        user.client_certificate_data.as_deref(),
        user.client_certificate.as_deref(),
        base_dir,
    )
    .context("client-certificate")?;
    let key = data_or_file(user.client_key_data.as_deref(), user.client_key.as_deref(), base_dir)
        .context("client-key")?;
    match (cert, key) {
        (Some(mut cert), Some(key)) => {
            if !cert.ends_with(b"\n") {
                cert.push(b'\n');
            }
            cert.extend_from_slice(&key);
            return Ok(ClusterAuth::ClientCert(cert));
        }
        (None, None) => {}
        _ => anyhow::bail!("client certificate and key must be provided together"),
    }

    if let Some(ref username) = user.username {
        return Ok(ClusterAuth::Basic { username: username.clone(), password: user.password.clone() });
    }
    Ok(ClusterAuth::None)
}

/// Inline base64 `data` wins over a `file` reference.
fn data_or_file(
    data: Option<&str>,
    file: Option<&str>,
    base_dir: &Path,
) -> anyhow::Result<Option<Vec<u8>>> {
    if let Some(data) = data.filter(|d| !d.is_empty()) {
        let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
        return Ok(Some(bytes));
    }
    match file.filter(|f| !f.is_empty()) {
        Some(file) => {
            let path = resolve(base_dir, file);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(Some(bytes))
        }
        None => Ok(None),
    }
}

fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
#[path = "kubeconfig_tests.rs"]
mod tests;
