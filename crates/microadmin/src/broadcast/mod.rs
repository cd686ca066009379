// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Refresh broadcaster: resolves an application's members and delivers the
//! refresh command to each one.
//!
//! - **Isolation**: one member failing (or hanging until its delivery
//!   timeout) never stops delivery to the others.
//! - **Bounded fan-out**: at most `max_concurrent` deliveries in flight; a
//!   limit of 1 delivers sequentially in resolver order.
//! - **Single attempt**: no retries. Callers that need eventual delivery
//!   re-trigger the broadcast.

pub mod result;

use std::fmt;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::delivery::{RefreshCommand, RefreshTransport};
use crate::error::AdminError;
use crate::membership::{Member, MembershipResolver};

pub use self::result::{BroadcastResult, BroadcastSummary, DeliveryOutcome, MemberOutcome, Verdict};

/// Default maximum deliveries in flight per broadcast.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Why a broadcast could not start. Member-level failures are never errors;
/// they are recorded in the [`BroadcastResult`].
#[derive(Debug)]
pub enum BroadcastError {
    /// The application identifier was empty.
    EmptyApplication,
    /// The membership query itself failed.
    Discovery(anyhow::Error),
}

impl BroadcastError {
    pub fn code(&self) -> AdminError {
        match self {
            Self::EmptyApplication => AdminError::BadRequest,
            Self::Discovery(_) => AdminError::DiscoveryFailed,
        }
    }
}

impl fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyApplication => f.write_str("application identifier must not be empty"),
            Self::Discovery(e) => write!(f, "membership discovery failed: {e:#}"),
        }
    }
}

impl std::error::Error for BroadcastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyApplication => None,
            Self::Discovery(e) => Some(&**e),
        }
    }
}

/// One member's result slot: settled immediately, or waiting on its delivery task.
enum Slot {
    Settled(MemberOutcome),
    Pending(Member, JoinHandle<DeliveryOutcome>),
}

/// Delivers refresh commands to every member of an application.
pub struct Broadcaster {
    resolver: Arc<dyn MembershipResolver>,
    transport: Arc<dyn RefreshTransport>,
    max_concurrent: usize,
}

impl Broadcaster {
    pub fn new(resolver: Arc<dyn MembershipResolver>, transport: Arc<dyn RefreshTransport>) -> Self {
        Self { resolver, transport, max_concurrent: DEFAULT_MAX_CONCURRENT }
    }

    /// Cap deliveries in flight (clamped to at least 1).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Refresh every current member of `application`.
    ///
    /// Errors only when the broadcast cannot start; otherwise every member
    /// is attempted exactly once and the result carries the verdict.
    pub async fn broadcast(&self, application: &str) -> Result<BroadcastResult, BroadcastError> {
        if application.is_empty() {
            return Err(BroadcastError::EmptyApplication);
        }

        let members = match self.resolver.resolve(application).await {
            Ok(members) => members,
            Err(e) => {
                error!(app = application, err = %format!("{e:#}"), "failed to resolve members");
                return Err(BroadcastError::Discovery(e));
            }
        };
        info!(app = application, members = members.len(), "broadcasting refresh");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut slots = Vec::with_capacity(members.len());

        for member in members {
            let Some(address) = member.reachable_address().map(str::to_owned) else {
                info!(app = application, member = %member.name, "member has no address, skipping");
                slots.push(Slot::Settled(MemberOutcome::new(member, DeliveryOutcome::Skipped)));
                continue;
            };

            // Permit before spawn: deliveries start in resolver order.
            let permit = Arc::clone(&semaphore).acquire_owned().await.ok();
            let transport = Arc::clone(&self.transport);
            let app = application.to_owned();
            let name = member.name.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                deliver_one(transport.as_ref(), &app, &name, &address).await
            });
            slots.push(Slot::Pending(member, handle));
        }

        // Wait for every delivery; no early return on failure.
        let mut outcomes = Vec::with_capacity(slots.len());
        for slot in slots {
            let outcome = match slot {
                Slot::Settled(outcome) => outcome,
                Slot::Pending(member, handle) => {
                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!(app = application, member = %member.name, err = %e, "delivery task failed");
                            DeliveryOutcome::Failed { reason: format!("delivery task failed: {e}") }
                        }
                    };
                    MemberOutcome::new(member, outcome)
                }
            };
            outcomes.push(outcome);
        }

        let result = BroadcastResult { application: application.to_owned(), outcomes };
        match result.verdict() {
            Verdict::Success => info!(
                app = application,
                total = result.total(),
                delivered = result.delivered(),
                skipped = result.skipped(),
                "refresh request sent to all members"
            ),
            Verdict::Fail => warn!(
                app = application,
                total = result.total(),
                delivered = result.delivered(),
                skipped = result.skipped(),
                failed = result.failed(),
                "refresh failed for some members"
            ),
        }
        Ok(result)
    }
}

async fn deliver_one(
    transport: &dyn RefreshTransport,
    app: &str,
    member: &str,
    address: &str,
) -> DeliveryOutcome {
    match transport.deliver(address, RefreshCommand).await {
        Ok(()) => {
            info!(app, member, address, "refresh request sent to member");
            DeliveryOutcome::Delivered
        }
        Err(e) => {
            warn!(app, member, address, err = %e, "failed to send refresh request to member");
            DeliveryOutcome::Failed { reason: e.to_string() }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
