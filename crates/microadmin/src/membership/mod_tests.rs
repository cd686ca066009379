// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_address_is_absent() {
    let member = Member::new("worker-0", "");
    assert_eq!(member.address, None);
    assert_eq!(member.reachable_address(), None);
}

#[test]
fn blank_address_is_not_reachable() {
    let member = Member { name: "worker-0".into(), address: Some("  ".into()) };
    assert_eq!(member.reachable_address(), None);
}

#[test]
fn address_is_kept() {
    let member = Member::new("worker-0", "10.0.0.1");
    assert_eq!(member.reachable_address(), Some("10.0.0.1"));
}

#[tokio::test]
async fn static_resolver_exact_match() -> anyhow::Result<()> {
    let resolver = StaticResolver::new()
        .with_app("producer", vec![Member::new("p-0", "10.0.0.1")])
        .with_app("producer-canary", vec![Member::new("pc-0", "10.0.0.9")]);

    let members = resolver.resolve("producer").await?;
    assert_eq!(members, vec![Member::new("p-0", "10.0.0.1")]);
    Ok(())
}

#[tokio::test]
async fn static_resolver_unknown_app_is_empty() -> anyhow::Result<()> {
    let resolver = StaticResolver::new().with_app("producer", vec![Member::new("p-0", "10.0.0.1")]);
    assert!(resolver.resolve("Producer").await?.is_empty());
    assert!(resolver.resolve("consumer").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn static_resolver_rejects_empty_app() {
    let resolver = StaticResolver::new();
    assert!(resolver.resolve("").await.is_err());
}
