// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for context.rs

use crate::config::{Config, ControllerConfig};
use crate::context::Context;
use crate::reconcilers::ingressroute::IngressRouteReconciler;
use crate::testing::InMemoryClient;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn context(controller: &ControllerConfig, shutdown: CancellationToken) -> Context<InMemoryClient> {
    let reconciler = IngressRouteReconciler::from_config(&Config::default()).unwrap();
    Context::new(InMemoryClient::new(), reconciler, shutdown, controller)
}

#[test]
fn test_new_copies_controller_timing() {
    let controller = ControllerConfig {
        reconcile_timeout_seconds: 12,
        error_requeue_seconds: 7,
    };

    let ctx = context(&controller, CancellationToken::new());

    assert_eq!(ctx.reconcile_timeout, Duration::from_secs(12));
    assert_eq!(ctx.error_requeue, Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn test_cycle_token_carries_deadline() {
    let ctx = context(&ControllerConfig::default(), CancellationToken::new());
    let before = tokio::time::Instant::now();

    let cycle = ctx.cycle_token();

    assert_eq!(
        cycle.deadline(),
        Some(before + ControllerConfig::default().reconcile_timeout())
    );
    assert!(!cycle.is_cancelled());
}

#[test]
fn test_shutdown_cancels_cycle_tokens() {
    let shutdown = CancellationToken::new();
    let ctx = context(&ControllerConfig::default(), shutdown.clone());
    let cycle = ctx.cycle_token();

    shutdown.cancel();

    assert!(cycle.is_cancelled());
}

#[test]
fn test_cancelled_cycle_leaves_shutdown_untouched() {
    let ctx = context(&ControllerConfig::default(), CancellationToken::new());

    ctx.cycle_token().cancel();

    assert!(!ctx.shutdown.is_cancelled());
    assert!(!ctx.cycle_token().is_cancelled());
}
