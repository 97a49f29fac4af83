// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `IngressRoute` controller wiring.
//!
//! The controller watches every `IngressRoute` in the cluster, the secondary
//! resources the configured integrations own, and the objects integrations
//! read (the external-dns target `Service`). A change to a watched object is
//! mapped back to the routes that depend on it through the controller's own
//! reflector store.

use crate::client::{ClusterClient, KubeClusterClient, NamespacedName};
use crate::constants::KIND_INGRESS_ROUTE;
use crate::context::Context;
use crate::crd::{Certificate, DNSEndpoint, IngressRoute};
use crate::errors::Error;
use crate::integrations::{Integration, ResourceKind, WatchedObject};
use crate::metrics;
use crate::reconcilers::ingressroute::IngressRouteReconciler;
use crate::reconcilers::mapping::routes_for_dependency;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use kube::api::Api;
use kube::core::NamespaceResourceScope;
use kube::runtime::controller::Action;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reconciliation error wrapper
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] Error);

impl ReconcileError {
    /// The underlying error.
    #[must_use]
    pub fn inner(&self) -> &Error {
        &self.0
    }
}

/// Error policy for the `IngressRoute` controller.
///
/// Requeues the route after the configured delay.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
pub fn error_policy<C: ClusterClient>(
    route: Arc<IngressRoute>,
    err: &ReconcileError,
    ctx: Arc<Context<C>>,
) -> Action {
    error!(
        route = %NamespacedName::of(&*route),
        error = %err,
        "Reconciliation error - will retry in {}s",
        ctx.error_requeue.as_secs()
    );
    metrics::record_reconciliation_requeue(KIND_INGRESS_ROUTE, err.inner().error_type());
    Action::requeue(ctx.error_requeue)
}

/// Runs one cycle for `route` and records its metrics.
///
/// # Errors
///
/// Returns whatever the cycle returned; the controller hands it to [`error_policy`].
pub async fn reconcile<C: ClusterClient>(
    route: Arc<IngressRoute>,
    ctx: Arc<Context<C>>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();
    let id = NamespacedName::of(&*route);
    let cycle = ctx.cycle_token();

    let result = ctx.reconciler.reconcile(&ctx.client, &cycle, &id).await;

    let duration = start.elapsed();
    match result {
        Ok(outcome) => {
            debug!(route = %id, outcome = ?outcome, "Reconciliation finished");
            metrics::record_reconciliation_success(KIND_INGRESS_ROUTE, duration);
            Ok(Action::await_change())
        }
        Err(e) => {
            metrics::record_reconciliation_error(KIND_INGRESS_ROUTE, duration);
            metrics::record_error(KIND_INGRESS_ROUTE, e.error_type());
            Err(ReconcileError::from(e))
        }
    }
}

/// Watches `watched` and requeues the routes that depend on it.
///
/// Only the one watched object is listed, via a name field selector.
fn watch_dependency<W>(
    controller: Controller<IngressRoute>,
    client: &Client,
    watched: WatchedObject,
    reconciler: IngressRouteReconciler,
) -> Controller<IngressRoute>
where
    W: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + DeserializeOwned
        + Debug
        + Send
        + Sync
        + 'static,
{
    let store = controller.store();
    let api = Api::<W>::namespaced(client.clone(), &watched.id.namespace);
    let config = WatcherConfig::default().fields(&format!("metadata.name={}", watched.id.name));
    let kind = watched.kind;

    controller.watches(api, config, move |object: W| {
        routes_for_dependency(&store, kind, &NamespacedName::of(&object), &reconciler)
    })
}

/// Builds the controller for the configured integrations.
#[must_use]
pub fn build_controller(
    client: &Client,
    reconciler: &IngressRouteReconciler,
) -> Controller<IngressRoute> {
    let watcher_config = WatcherConfig::default();
    let mut controller = Controller::new(
        Api::<IngressRoute>::all(client.clone()),
        watcher_config.clone(),
    );

    for integration in reconciler.integrations() {
        let owned = integration.owned_resource();
        debug!(integration = integration.name(), kind = owned.kind(), "Watching owned resources");
        controller = match owned {
            ResourceKind::Certificate => {
                controller.owns(Api::<Certificate>::all(client.clone()), watcher_config.clone())
            }
            ResourceKind::DnsEndpoint => {
                controller.owns(Api::<DNSEndpoint>::all(client.clone()), watcher_config.clone())
            }
            ResourceKind::Service => {
                controller.owns(Api::<Service>::all(client.clone()), watcher_config.clone())
            }
        };

        if let Some(watched) = integration.watched_object() {
            debug!(
                integration = integration.name(),
                kind = watched.kind.kind(),
                object = %watched.id,
                "Watching dependency"
            );
            let reconciler = reconciler.clone();
            controller = match watched.kind {
                ResourceKind::Service => {
                    watch_dependency::<Service>(controller, client, watched, reconciler)
                }
                ResourceKind::Certificate => {
                    watch_dependency::<Certificate>(controller, client, watched, reconciler)
                }
                ResourceKind::DnsEndpoint => {
                    watch_dependency::<DNSEndpoint>(controller, client, watched, reconciler)
                }
            };
        }
    }

    controller
}

/// Runs the `IngressRoute` controller until the shutdown token is cancelled.
///
/// # Errors
///
/// Currently never fails; the controller logs and retries watch errors itself.
pub async fn run_controller(ctx: Arc<Context<KubeClusterClient>>) -> anyhow::Result<()> {
    info!("Starting {KIND_INGRESS_ROUTE} controller");

    let controller = build_controller(ctx.client.inner(), &ctx.reconciler);

    controller
        .graceful_shutdown_on(ctx.shutdown.clone().cancelled_owned())
        .run(
            reconcile::<KubeClusterClient>,
            error_policy::<KubeClusterClient>,
            ctx,
        )
        .for_each(|result| {
            if let Err(e) = result {
                warn!(error = %e, "Controller stream error");
            }
            futures::future::ready(())
        })
        .await;

    info!("{KIND_INGRESS_ROUTE} controller stopped");
    Ok(())
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
