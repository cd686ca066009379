// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP delivery: `POST http://<address>:<port><path>` with an empty body.

use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use super::{DeliveryError, RefreshCommand, RefreshTransport};

/// HTTP client for the refresh route every worker serves.
pub struct HttpTransport {
    port: u16,
    path: String,
    client: Client,
}

impl HttpTransport {
    /// `timeout` bounds each delivery from connect to the last response byte.
    pub fn new(port: u16, path: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { port, path: path.into(), client })
    }

    /// Refresh URL for a member address. Bare IPv6 addresses are bracketed.
    pub fn url(&self, address: &str) -> String {
        let host = if address.contains(':') && !address.starts_with('[') {
            format!("[{address}]")
        } else {
            address.to_owned()
        };
        format!("http://{host}:{}{}", self.port, self.path)
    }
}

impl RefreshTransport for HttpTransport {
    fn deliver<'a>(
        &'a self,
        address: &'a str,
        _command: RefreshCommand,
    ) -> BoxFuture<'a, Result<(), DeliveryError>> {
        async move {
            let url = self.url(address);
            debug!(%url, "sending refresh request");
            let resp = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        DeliveryError::Transport(format!("timed out: {e}"))
                    } else {
                        DeliveryError::Transport(e.to_string())
                    }
                })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(DeliveryError::Status(status.as_u16()));
            }
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
