// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! external-dns integration.
//!
//! Writes one `DNSEndpoint` per route, named after the route, with a record set
//! per host pointing at the configured [`Target`]. Targets are typed by their
//! syntax: IPv4 addresses become `A` records, IPv6 addresses `AAAA` and
//! anything else a `CNAME`.

use crate::cancel::CycleToken;
use crate::client::ClusterClient;
use crate::constants::{DEFAULT_DNS_RECORD_TTL_SECS, INTEGRATION_EXTERNAL_DNS};
use crate::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint, IngressRoute};
use crate::errors::Error;
use crate::hosts::IngressInfo;
use crate::integrations::{Integration, ResourceKind, WatchedObject};
use crate::reconcilers::resources::{
    controller_owner_ref, create_or_update, set_controller_reference, UpsertOutcome,
};
use crate::target::Target;
use async_trait::async_trait;
use kube::ResourceExt;
use std::collections::BTreeSet;
use std::net::IpAddr;
use tracing::debug;

/// Keeps a `DNSEndpoint` in sync with the hosts of a route.
#[derive(Clone, Debug)]
pub struct ExternalDns {
    target: Target,
}

impl ExternalDns {
    /// Creates the integration for `target`.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self { target }
    }

    /// Where the records point.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }
}

#[async_trait]
impl Integration for ExternalDns {
    fn name(&self) -> &'static str {
        INTEGRATION_EXTERNAL_DNS
    }

    fn owned_resource(&self) -> ResourceKind {
        ResourceKind::DnsEndpoint
    }

    fn watched_object(&self) -> Option<WatchedObject> {
        self.target.namespaced_name().map(|id| WatchedObject {
            kind: ResourceKind::Service,
            id: id.clone(),
        })
    }

    async fn update_resource<C: ClusterClient>(
        &self,
        cycle: &CycleToken,
        client: &C,
        route: &IngressRoute,
        info: &IngressInfo,
    ) -> Result<Option<UpsertOutcome>, Error> {
        let owner = controller_owner_ref(route)?;
        let targets = self.target.targets(client, cycle).await?;
        let endpoints = build_endpoints(&info.hosts, &targets);
        debug!(
            route = %route.name_any(),
            records = endpoints.len(),
            "Computed DNS records"
        );

        let mut fresh = DNSEndpoint::new(&route.name_any(), DNSEndpointSpec::default());
        fresh.metadata.namespace = route.namespace();

        let outcome = create_or_update(client, cycle, fresh, |endpoint| {
            endpoint.spec.endpoints.clone_from(&endpoints);
            set_controller_reference(endpoint, &owner)
        })
        .await?;
        Ok(Some(outcome))
    }
}

/// One endpoint per host and record type, hosts in sorted order.
#[must_use]
pub fn build_endpoints(hosts: &BTreeSet<String>, targets: &[String]) -> Vec<Endpoint> {
    let mut ipv4 = Vec::new();
    let mut ipv6 = Vec::new();
    let mut names = Vec::new();
    for target in targets {
        match target.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => ipv4.push(target.clone()),
            Ok(IpAddr::V6(_)) => ipv6.push(target.clone()),
            Err(_) => names.push(target.clone()),
        }
    }

    let groups = [("A", ipv4), ("AAAA", ipv6), ("CNAME", names)];
    hosts
        .iter()
        .flat_map(|host| {
            groups
                .iter()
                .filter(|(_, targets)| !targets.is_empty())
                .map(move |(record_type, targets)| Endpoint {
                    dns_name: host.clone(),
                    targets: targets.clone(),
                    record_type: (*record_type).to_string(),
                    record_ttl: Some(DEFAULT_DNS_RECORD_TTL_SECS),
                    ..Default::default()
                })
        })
        .collect()
}

#[cfg(test)]
#[path = "external_dns_tests.rs"]
mod external_dns_tests;
