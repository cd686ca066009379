// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-member outcomes and their aggregate.

use serde::{Deserialize, Serialize};

use crate::membership::Member;

/// What happened to one member during a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    /// No address: never attempted.
    Skipped,
    Failed { reason: String },
}

/// Pass/fail for a whole broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberOutcome {
    pub name: String,
    pub address: Option<String>,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

impl MemberOutcome {
    pub fn new(member: Member, outcome: DeliveryOutcome) -> Self {
        Self { name: member.name, address: member.address, outcome }
    }
}

/// Every member's outcome for one broadcast, in resolver order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastResult {
    pub application: String,
    pub outcomes: Vec<MemberOutcome>,
}

impl BroadcastResult {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Delivered))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Failed { .. }))
    }

    /// Members a delivery was attempted for (everything not skipped).
    pub fn attempted(&self) -> usize {
        self.total() - self.skipped()
    }

    /// Fail iff at least one attempted delivery failed.
    pub fn verdict(&self) -> Verdict {
        if self.failed() > 0 {
            Verdict::Fail
        } else {
            Verdict::Success
        }
    }

    pub fn is_success(&self) -> bool {
        self.verdict() == Verdict::Success
    }

    /// Outcome recorded for the member called `name`, if any.
    pub fn outcome_for(&self, name: &str) -> Option<&DeliveryOutcome> {
        self.outcomes.iter().find(|o| o.name == name).map(|o| &o.outcome)
    }

    pub fn summary(&self) -> BroadcastSummary {
        BroadcastSummary {
            application: self.application.clone(),
            total: self.total(),
            delivered: self.delivered(),
            skipped: self.skipped(),
            failed: self.failed(),
            verdict: self.verdict(),
        }
    }

    /// One-line human-readable description of a failed broadcast.
    pub fn failure_message(&self) -> String {
        let failed: Vec<&str> = self
            .outcomes
            .iter()
            .filter(|o| matches!(o.outcome, DeliveryOutcome::Failed { .. }))
            .map(|o| o.name.as_str())
            .collect();
        format!(
            "refresh failed for {} of {} members of {}: {}",
            failed.len(),
            self.attempted(),
            self.application,
            failed.join(", ")
        )
    }

    fn count(&self, pred: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

/// Counts-only view of a [`BroadcastResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastSummary {
    pub application: String,
    pub total: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
    pub verdict: Verdict,
}
