// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resolution of the addresses DNS records point at.
//!
//! A [`Target`] is either a fixed list of addresses from the configuration or a
//! reference to a `Service` (typically the Traefik load balancer) whose externally
//! visible addresses are looked up on every cycle.

use crate::cancel::CycleToken;
use crate::client::{ClusterClient, NamespacedName};
use crate::errors::Error;
use k8s_openapi::api::core::v1::Service;
use tracing::debug;

/// Where DNS record targets come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Fixed IPv4/IPv6 addresses or hostnames.
    Static(Vec<String>),
    /// Addresses of a live `Service`.
    Service(NamespacedName),
}

impl Target {
    /// Resolves the current targets.
    ///
    /// # Errors
    ///
    /// For [`Target::Service`], any failure fetching the service is returned,
    /// including [`Error::NotFound`]. Static targets never fail.
    pub async fn targets<C: ClusterClient>(
        &self,
        client: &C,
        cycle: &CycleToken,
    ) -> Result<Vec<String>, Error> {
        match self {
            Target::Static(addresses) => Ok(addresses.clone()),
            Target::Service(id) => {
                let operation = format!("get Service {id}");
                let service: Service = cycle.run(&operation, client.get(id)).await?;
                let targets = targets_from_service(&service);
                debug!(service = %id, targets = ?targets, "Resolved service targets");
                Ok(targets)
            }
        }
    }

    /// Identity of the watched service, or `None` for static targets.
    #[must_use]
    pub fn namespaced_name(&self) -> Option<&NamespacedName> {
        match self {
            Target::Static(_) => None,
            Target::Service(id) => Some(id),
        }
    }
}

/// Externally visible addresses of a service.
///
/// The first load balancer ingress with a hostname wins on its own, since a name
/// can carry a single CNAME. Otherwise every load balancer IP is returned, and
/// when there is none the cluster IPs are used.
#[must_use]
pub fn targets_from_service(service: &Service) -> Vec<String> {
    let ingresses = service
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref());

    let mut targets = Vec::new();
    for ingress in ingresses.into_iter().flatten() {
        if let Some(hostname) = ingress.hostname.as_ref().filter(|h| !h.is_empty()) {
            return vec![hostname.clone()];
        }
        if let Some(ip) = ingress.ip.as_ref().filter(|ip| !ip.is_empty()) {
            targets.push(ip.clone());
        }
    }

    if targets.is_empty() {
        if let Some(spec) = service.spec.as_ref() {
            match spec.cluster_ips.as_ref() {
                Some(ips) if !ips.is_empty() => targets.extend(ips.iter().cloned()),
                _ => targets.extend(spec.cluster_ip.iter().cloned()),
            }
        }
    }

    targets
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod target_tests;
