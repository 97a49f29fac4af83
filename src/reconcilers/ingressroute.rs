// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `IngressRoute` reconciliation.
//!
//! A cycle for one route:
//!
//! 1. Fetch the route. A missing route was deleted: nothing to do, owned
//!    resources are garbage collected through their owner references.
//! 2. Drop routes rejected by the [`Selector`].
//! 3. Derive the [`IngressInfo`] (TLS domains first, then `Host` rules).
//! 4. Run every integration in order, skipping those the route opts out of.
//!    The first failure aborts the cycle.

use crate::cancel::CycleToken;
use crate::client::{ClusterClient, NamespacedName};
use crate::config::Config;
use crate::crd::IngressRoute;
use crate::errors::Error;
use crate::hosts::IngressInfo;
use crate::integrations::cert_manager::CertManager;
use crate::integrations::external_dns::ExternalDns;
use crate::integrations::{AnyIntegration, Integration};
use crate::metrics;
use crate::reconcilers::resources::UpsertOutcome;
use crate::selector::Selector;
use kube::ResourceExt;
use tracing::{debug, error, info};

/// What happened to one integration during a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegrationStatus {
    /// The route opted out through the ignore annotation.
    Skipped,
    /// The integration had nothing to write for this route.
    NothingToDo,
    /// The secondary resource was upserted.
    Applied(UpsertOutcome),
}

/// Result of a successful cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The route no longer exists.
    Deleted,
    /// The selector rejected the route.
    NotSelected,
    /// Every integration ran or was skipped, in configured order.
    Synced(Vec<(&'static str, IntegrationStatus)>),
}

/// Drives the configured integrations for `IngressRoute` objects.
#[derive(Clone, Debug)]
pub struct IngressRouteReconciler {
    selector: Selector,
    integrations: Vec<AnyIntegration>,
}

impl IngressRouteReconciler {
    /// Creates a reconciler running `integrations` in the given order.
    #[must_use]
    pub fn new(selector: Selector, integrations: Vec<AnyIntegration>) -> Self {
        Self {
            selector,
            integrations,
        }
    }

    /// Builds the selector and integrations from the configuration.
    ///
    /// external-dns runs before cert-manager.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if an integration section is invalid.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut integrations = Vec::new();
        if let Some(external_dns) = &config.integrations.external_dns {
            integrations.push(AnyIntegration::ExternalDns(ExternalDns::new(
                external_dns.target()?,
            )));
        }
        if let Some(cert_manager) = &config.integrations.cert_manager {
            integrations.push(AnyIntegration::CertManager(CertManager::new(
                cert_manager.certificate_template.clone(),
            )));
        }

        Ok(Self::new(
            Selector::new(config.selector.ingress_class.clone()),
            integrations,
        ))
    }

    /// The route selector.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Integrations in the order they run.
    #[must_use]
    pub fn integrations(&self) -> &[AnyIntegration] {
        &self.integrations
    }

    /// Reconciles the route `id`.
    ///
    /// # Errors
    ///
    /// Returns the first error met: fetching the route (other than not-found),
    /// parsing its rules, or running an integration.
    pub async fn reconcile<C: ClusterClient>(
        &self,
        client: &C,
        cycle: &CycleToken,
        id: &NamespacedName,
    ) -> Result<ReconcileOutcome, Error> {
        let route: IngressRoute = match cycle
            .run(&format!("get IngressRoute {id}"), client.get(id))
            .await
        {
            Ok(route) => route,
            Err(e) if e.is_not_found() => {
                debug!(route = %id, "IngressRoute no longer exists");
                return Ok(ReconcileOutcome::Deleted);
            }
            Err(e) => {
                error!(route = %id, error = %e, "Unable to query IngressRoute");
                return Err(e);
            }
        };

        if !self.selector.matches(route.annotations()) {
            debug!(route = %id, "Ignoring IngressRoute");
            return Ok(ReconcileOutcome::NotSelected);
        }
        debug!(route = %id, "Reconciling IngressRoute");

        let info = IngressInfo::from_route(&route).map_err(|e| {
            error!(route = %id, error = %e, "Failed to parse hosts from IngressRoute");
            e
        })?;

        let mut statuses = Vec::with_capacity(self.integrations.len());
        for integration in &self.integrations {
            let name = integration.name();
            if !self
                .selector
                .matches_integration(route.annotations(), name)
            {
                debug!(route = %id, integration = name, "Ignoring integration");
                metrics::record_integration_skipped(name);
                statuses.push((name, IntegrationStatus::Skipped));
                continue;
            }

            let status = match integration
                .update_resource(cycle, client, &route, &info)
                .await
            {
                Ok(Some(outcome)) => IntegrationStatus::Applied(outcome),
                Ok(None) => IntegrationStatus::NothingToDo,
                Err(e) => {
                    error!(
                        route = %id,
                        integration = name,
                        error = %e,
                        "Failed to upsert resource"
                    );
                    return Err(e);
                }
            };
            debug!(route = %id, integration = name, status = ?status, "Upserted resource");
            statuses.push((name, status));
        }

        info!(route = %id, hosts = info.hosts.len(), "IngressRoute is up to date");
        Ok(ReconcileOutcome::Synced(statuses))
    }
}

#[cfg(test)]
#[path = "ingressroute_tests.rs"]
mod ingressroute_tests;
