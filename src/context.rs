// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `IngressRoute` controller.
//!
//! Every reconciliation receives an `Arc<Context>` holding:
//! - the cluster client used for all reads and writes
//! - the reconciler with its selector and ordered integrations
//! - the process-wide shutdown token every cycle token derives from
//! - the per-cycle deadline and the error requeue delay

use crate::cancel::CycleToken;
use crate::client::{ClusterClient, KubeClusterClient};
use crate::config::ControllerConfig;
use crate::reconcilers::ingressroute::IngressRouteReconciler;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Shared context passed to every reconciliation.
#[derive(Clone)]
pub struct Context<C: ClusterClient = KubeClusterClient> {
    /// Client for API operations
    pub client: C,

    /// Selector and integrations
    pub reconciler: IngressRouteReconciler,

    /// Cancelled on SIGTERM/SIGINT or when leadership is lost
    pub shutdown: CancellationToken,

    /// Deadline of a single cycle
    pub reconcile_timeout: Duration,

    /// Delay before a failed route is retried
    pub error_requeue: Duration,
}

impl<C: ClusterClient> Context<C> {
    /// Creates a context from the controller settings.
    #[must_use]
    pub fn new(
        client: C,
        reconciler: IngressRouteReconciler,
        shutdown: CancellationToken,
        controller: &ControllerConfig,
    ) -> Self {
        Self {
            client,
            reconciler,
            shutdown,
            reconcile_timeout: controller.reconcile_timeout(),
            error_requeue: controller.error_requeue(),
        }
    }

    /// A fresh token for one cycle, bounded by the shutdown token and the cycle deadline.
    #[must_use]
    pub fn cycle_token(&self) -> CycleToken {
        CycleToken::child_with_timeout(&self.shutdown, self.reconcile_timeout)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
