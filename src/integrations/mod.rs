// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integrations keep one secondary resource per `IngressRoute` in sync.
//!
//! # Available integrations
//!
//! - [`external_dns::ExternalDns`] - `DNSEndpoint` records pointing the route's hosts at a target
//! - [`cert_manager::CertManager`] - `Certificate` covering the route's hosts
//!
//! Integrations run in a fixed order (external-dns first) and are dispatched
//! through the closed [`AnyIntegration`] enum.

pub mod cert_manager;
pub mod external_dns;

use crate::cancel::CycleToken;
use crate::client::{ClusterClient, NamespacedName};
use crate::constants::{KIND_CERTIFICATE, KIND_DNS_ENDPOINT, KIND_SERVICE};
use crate::crd::IngressRoute;
use crate::hosts::IngressInfo;
use crate::reconcilers::resources::UpsertOutcome;
use async_trait::async_trait;
use cert_manager::CertManager;
use external_dns::ExternalDns;

/// Resource kinds the controller may need to watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// cert-manager `Certificate`
    Certificate,
    /// external-dns `DNSEndpoint`
    DnsEndpoint,
    /// core `Service`
    Service,
}

impl ResourceKind {
    /// Kubernetes kind name.
    #[must_use]
    pub fn kind(self) -> &'static str {
        match self {
            ResourceKind::Certificate => KIND_CERTIFICATE,
            ResourceKind::DnsEndpoint => KIND_DNS_ENDPOINT,
            ResourceKind::Service => KIND_SERVICE,
        }
    }
}

/// An object an integration reads on every cycle, so that changes to it must
/// trigger reconciliation of the routes using it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchedObject {
    /// Kind of the object
    pub kind: ResourceKind,
    /// Identity of the object
    pub id: NamespacedName,
}

/// A pluggable producer of one secondary resource per route.
#[async_trait]
pub trait Integration: Send + Sync {
    /// Stable name, matched against the ignore annotation.
    fn name(&self) -> &'static str;

    /// Kind of the secondary resource this integration creates.
    fn owned_resource(&self) -> ResourceKind;

    /// Object read during every update, if any.
    fn watched_object(&self) -> Option<WatchedObject>;

    /// Creates or updates the secondary resource of `route`.
    ///
    /// Returns `None` when there is nothing to write for this route.
    ///
    /// # Errors
    ///
    /// Returns any API, cancellation or ownership error. The caller aborts the
    /// remaining integrations of the cycle.
    async fn update_resource<C: ClusterClient>(
        &self,
        cycle: &CycleToken,
        client: &C,
        route: &IngressRoute,
        info: &IngressInfo,
    ) -> Result<Option<UpsertOutcome>, crate::errors::Error>;
}

/// Every integration the operator knows about.
#[derive(Clone, Debug)]
pub enum AnyIntegration {
    /// external-dns `DNSEndpoint` integration
    ExternalDns(ExternalDns),
    /// cert-manager `Certificate` integration
    CertManager(CertManager),
}

#[async_trait]
impl Integration for AnyIntegration {
    fn name(&self) -> &'static str {
        match self {
            AnyIntegration::ExternalDns(i) => i.name(),
            AnyIntegration::CertManager(i) => i.name(),
        }
    }

    fn owned_resource(&self) -> ResourceKind {
        match self {
            AnyIntegration::ExternalDns(i) => i.owned_resource(),
            AnyIntegration::CertManager(i) => i.owned_resource(),
        }
    }

    fn watched_object(&self) -> Option<WatchedObject> {
        match self {
            AnyIntegration::ExternalDns(i) => i.watched_object(),
            AnyIntegration::CertManager(i) => i.watched_object(),
        }
    }

    async fn update_resource<C: ClusterClient>(
        &self,
        cycle: &CycleToken,
        client: &C,
        route: &IngressRoute,
        info: &IngressInfo,
    ) -> Result<Option<UpsertOutcome>, crate::errors::Error> {
        match self {
            AnyIntegration::ExternalDns(i) => i.update_resource(cycle, client, route, info).await,
            AnyIntegration::CertManager(i) => i.update_resource(cycle, client, route, info).await,
        }
    }
}
