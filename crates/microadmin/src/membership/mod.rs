// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Membership resolution: which worker instances currently belong to an
//! application.

pub mod cluster;

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;

/// One discovered worker instance.
///
/// A snapshot only: members are re-resolved on every broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Stable name used for logging and correlation (e.g. the pod name).
    pub name: String,
    /// Network address, absent while the instance is not yet reachable.
    pub address: Option<String>,
}

impl Member {
    /// Build a member; an empty `address` is stored as absent.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        let address = address.into();
        Self { name: name.into(), address: (!address.is_empty()).then_some(address) }
    }

    /// Build a member that has no address yet.
    pub fn unaddressed(name: impl Into<String>) -> Self {
        Self { name: name.into(), address: None }
    }

    /// The address to deliver to, or `None` if the member must be skipped.
    pub fn reachable_address(&self) -> Option<&str> {
        self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

/// Answers "which members currently belong to application X?".
///
/// An unknown application resolves to an empty list; `Err` is reserved for
/// the query itself failing. Object-safe for use as `Arc<dyn MembershipResolver>`.
pub trait MembershipResolver: Send + Sync {
    fn resolve<'a>(&'a self, application: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<Member>>>;
}

/// Resolver over a fixed member list keyed by application.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    apps: HashMap<String, Vec<Member>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the members of `application`, replacing any previous list.
    pub fn with_app(mut self, application: impl Into<String>, members: Vec<Member>) -> Self {
        self.apps.insert(application.into(), members);
        self
    }
}

impl MembershipResolver for StaticResolver {
    fn resolve<'a>(&'a self, application: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<Member>>> {
        async move {
            if application.is_empty() {
                anyhow::bail!("application identifier must not be empty");
            }
            Ok(self.apps.get(application).cloned().unwrap_or_default())
        }
        .boxed()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
