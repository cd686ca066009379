// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound delivery of the refresh command to one member.

pub mod http;

use std::fmt;

use futures_util::future::BoxFuture;

pub use self::http::HttpTransport;

/// "Reload your configuration now."
///
/// Carries no data: arriving on the member's refresh route is the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshCommand;

/// Why a single delivery did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The member answered with a non-success status.
    Status(u16),
    /// The request never completed (connect error, reset, timeout).
    Transport(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "unexpected status code {code}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Delivers one command to one address. Exactly one attempt per call.
///
/// Object-safe for use as `Arc<dyn RefreshTransport>`.
pub trait RefreshTransport: Send + Sync {
    fn deliver<'a>(
        &'a self,
        address: &'a str,
        command: RefreshCommand,
    ) -> BoxFuture<'a, Result<(), DeliveryError>>;
}
