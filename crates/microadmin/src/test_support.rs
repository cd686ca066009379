// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: fake collaborators and an in-process server.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::net::TcpListener;

use crate::delivery::{DeliveryError, RefreshCommand, RefreshTransport};
use crate::membership::{Member, MembershipResolver};

/// Serve `router` on an ephemeral localhost port for the rest of the test.
pub async fn spawn_server(router: axum::Router) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(addr)
}

/// Resolver whose query always fails.
pub struct FailingResolver;

impl MembershipResolver for FailingResolver {
    fn resolve<'a>(&'a self, _application: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<Member>>> {
        async { Err(anyhow::anyhow!("api server unreachable")) }.boxed()
    }
}

/// Transport that records every attempted address.
///
/// Addresses in `failing` get a 500, addresses in `panicking` panic, and
/// addresses with a delay sleep before answering.
#[derive(Default)]
pub struct FakeTransport {
    failing: HashSet<String>,
    panicking: HashSet<String>,
    delays: HashMap<String, Duration>,
    attempts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, address: &str) -> Self {
        self.failing.insert(address.to_owned());
        self
    }

    pub fn panicking(mut self, address: &str) -> Self {
        self.panicking.insert(address.to_owned());
        self
    }

    pub fn delayed(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_owned(), delay);
        self
    }

    /// Addresses attempted so far, in the order attempts started.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Highest number of deliveries observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[allow(clippy::panic)]
impl RefreshTransport for FakeTransport {
    fn deliver<'a>(
        &'a self,
        address: &'a str,
        _command: RefreshCommand,
    ) -> BoxFuture<'a, Result<(), DeliveryError>> {
        async move {
            self.attempts.lock().unwrap_or_else(|e| e.into_inner()).push(address.to_owned());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self.delays.get(address).copied().unwrap_or(Duration::from_millis(5));
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panicking.contains(address) {
                panic!("transport blew up for {address}");
            }
            if self.failing.contains(address) {
                return Err(DeliveryError::Status(500));
            }
            Ok(())
        }
        .boxed()
    }
}

