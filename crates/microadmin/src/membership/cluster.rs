// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Membership backed by the Kubernetes pod list.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::{debug, info, warn};

use super::{Member, MembershipResolver};
use crate::kube::pod::{Pod, PodList};
use crate::kube::KubeClient;

/// Resolves an application to the pods labelled `<label_key>=<application>`.
pub struct KubeResolver {
    client: Arc<KubeClient>,
    namespace: String,
    label_key: String,
}

impl KubeResolver {
    pub fn new(client: Arc<KubeClient>, namespace: impl Into<String>, label_key: impl Into<String>) -> Self {
        Self { client, namespace: namespace.into(), label_key: label_key.into() }
    }

    pub fn label_selector(&self, application: &str) -> String {
        format!("{}={}", self.label_key, application)
    }
}

impl MembershipResolver for KubeResolver {
    fn resolve<'a>(&'a self, application: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<Member>>> {
        async move {
            if application.is_empty() {
                anyhow::bail!("application identifier must not be empty");
            }
            let selector = self.label_selector(application);
            let pods = match self.client.list_pods(&self.namespace, &selector).await {
                Ok(pods) => pods,
                Err(e) => {
                    warn!(app = application, namespace = %self.namespace, err = %e, "failed to list pods");
                    return Err(e);
                }
            };
            let members = members_from_pods(pods, &self.label_key, application);
            info!(app = application, namespace = %self.namespace, count = members.len(), "pods listed");
            Ok(members)
        }
        .boxed()
    }
}

/// Map a pod list to members, keeping only exact label matches.
///
/// Pods that are terminating or finished keep their name but lose their
/// address, so the broadcaster skips them instead of delivering.
pub fn members_from_pods(pods: PodList, label_key: &str, application: &str) -> Vec<Member> {
    pods.items
        .into_iter()
        .filter(|pod| pod.metadata.labels.get(label_key).is_some_and(|v| v == application))
        .map(|pod| to_member(&pod))
        .collect()
}

fn to_member(pod: &Pod) -> Member {
    let name = pod.metadata.name.clone();
    if pod.is_gone() {
        debug!(pod = %name, phase = ?pod.phase(), "pod is terminating or finished");
        return Member::unaddressed(name);
    }
    match pod.pod_ip() {
        Some(ip) => Member::new(name, ip),
        None => Member::unaddressed(name),
    }
}
