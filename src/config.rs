// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration file.
//!
//! The configuration is a YAML document read once at startup:
//!
//! ```yaml
//! health:
//!   healthProbeBindAddress: ":8081"
//! leaderElection:
//!   leaderElect: true
//!   resourceName: switchboard
//!   resourceNamespace: kube-system
//! metrics:
//!   bindAddress: ":8080"
//! controller:
//!   reconcileTimeoutSeconds: 30
//!   errorRequeueSeconds: 30
//! selector:
//!   ingressClass: traefik
//! integrations:
//!   externalDNS:
//!     targetService:
//!       name: traefik
//!       namespace: kube-system
//!   certManager:
//!     certificateTemplate:
//!       spec:
//!         issuerRef:
//!           kind: ClusterIssuer
//!           name: letsencrypt
//! ```
//!
//! Every section is optional. An integration is enabled by the presence of its
//! section. Validation failures are reported as [`Error::Configuration`].

use crate::client::NamespacedName;
use crate::constants::{
    DEFAULT_HEALTH_BIND_ADDRESS, DEFAULT_LEASE_NAME, DEFAULT_METRICS_BIND_ADDRESS,
    DEFAULT_RECONCILE_TIMEOUT_SECS, ERROR_REQUEUE_DURATION_SECS,
};
use crate::crd::CertificateSpec;
use crate::errors::Error;
use crate::target::Target;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Root of the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Health probe server
    pub health: HealthConfig,
    /// Leader election
    pub leader_election: LeaderElectionConfig,
    /// Metrics server
    pub metrics: MetricsConfig,
    /// Reconciliation timing
    pub controller: ControllerConfig,
    /// Which routes are processed
    pub selector: SelectorConfig,
    /// Enabled integrations
    pub integrations: IntegrationsConfig,
}

/// Health probe server settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthConfig {
    /// `host:port` of the probe server; `"0"` disables it
    pub health_probe_bind_address: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            health_probe_bind_address: DEFAULT_HEALTH_BIND_ADDRESS.to_string(),
        }
    }
}

/// Leader election settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaderElectionConfig {
    /// Run the controller only while holding the lease
    pub leader_elect: bool,
    /// Name of the `Lease` object
    pub resource_name: String,
    /// Namespace of the `Lease` object, defaults to the pod namespace
    pub resource_namespace: Option<String>,
}

impl Default for LeaderElectionConfig {
    fn default() -> Self {
        Self {
            leader_elect: false,
            resource_name: DEFAULT_LEASE_NAME.to_string(),
            resource_namespace: None,
        }
    }
}

/// Metrics server settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsConfig {
    /// `host:port` of the metrics server; `"0"` disables it
    pub bind_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_METRICS_BIND_ADDRESS.to_string(),
        }
    }
}

/// Reconciliation timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// Deadline of a single reconciliation cycle
    pub reconcile_timeout_seconds: u64,
    /// Delay before a failed route is reconciled again
    pub error_requeue_seconds: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reconcile_timeout_seconds: DEFAULT_RECONCILE_TIMEOUT_SECS,
            error_requeue_seconds: ERROR_REQUEUE_DURATION_SECS,
        }
    }
}

impl ControllerConfig {
    /// Deadline of a single reconciliation cycle.
    #[must_use]
    pub fn reconcile_timeout(&self) -> Duration {
        Duration::from_secs(self.reconcile_timeout_seconds)
    }

    /// Delay before a failed route is reconciled again.
    #[must_use]
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_seconds)
    }
}

/// Route selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorConfig {
    /// Required value of `kubernetes.io/ingress.class`
    pub ingress_class: Option<String>,
}

/// Integrations; each one is enabled by the presence of its section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrationsConfig {
    /// external-dns `DNSEndpoint` integration
    #[serde(rename = "externalDNS")]
    pub external_dns: Option<ExternalDnsConfig>,
    /// cert-manager `Certificate` integration
    pub cert_manager: Option<CertManagerConfig>,
}

/// external-dns integration. Exactly one of the two fields must be set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalDnsConfig {
    /// Service whose external addresses the records point at
    pub target_service: Option<ServiceRef>,
    /// Fixed record targets
    #[serde(rename = "targetIPs")]
    pub target_ips: Vec<String>,
}

impl ExternalDnsConfig {
    /// Builds the record target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] unless exactly one of `targetService`
    /// and `targetIPs` is set.
    pub fn target(&self) -> Result<Target, Error> {
        match (&self.target_service, self.target_ips.is_empty()) {
            (Some(service), true) => Ok(Target::Service(NamespacedName::new(
                service.namespace.clone(),
                service.name.clone(),
            ))),
            (None, false) => Ok(Target::Static(self.target_ips.clone())),
            _ => Err(Error::Configuration(
                "exactly one of `targetService` and `targetIPs` must be set for external-dns"
                    .to_string(),
            )),
        }
    }
}

/// Reference to a Kubernetes service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRef {
    /// Service name
    pub name: String,
    /// Service namespace
    pub namespace: String,
}

/// cert-manager integration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertManagerConfig {
    /// Template every generated certificate starts from
    pub certificate_template: CertificateTemplate,
}

/// Metadata and spec copied into every generated `Certificate`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateTemplate {
    /// Labels and annotations merged onto the certificate
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Base spec; `dnsNames` and `secretName` are always overwritten
    pub spec: CertificateSpec,
}

impl Config {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the YAML is malformed.
    pub fn from_yaml(contents: &str) -> Result<Self, Error> {
        serde_yaml::from_str(contents)
            .map_err(|e| Error::Configuration(format!("failed to parse config: {e}")))
    }

    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&contents)
    }

    /// Checks everything that can be checked without a cluster.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::Configuration`] found.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(external_dns) = &self.integrations.external_dns {
            external_dns.target()?;
        }
        if self.leader_election.leader_elect && self.leader_election.resource_name.is_empty() {
            return Err(Error::Configuration(
                "leaderElection.resourceName must be set when leaderElect is enabled".to_string(),
            ));
        }
        if self.controller.reconcile_timeout_seconds == 0 {
            return Err(Error::Configuration(
                "controller.reconcileTimeoutSeconds must be greater than zero".to_string(),
            ));
        }
        parse_bind_address(&self.metrics.bind_address)?;
        parse_bind_address(&self.health.health_probe_bind_address)?;
        Ok(())
    }
}

/// Parses a listener address.
///
/// Accepts `host:port`, `:port` (all interfaces) and `[v6]:port`. An empty
/// string or `"0"` disables the listener and yields `None`.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the address cannot be parsed.
pub fn parse_bind_address(address: &str) -> Result<Option<SocketAddr>, Error> {
    let address = address.trim();
    if address.is_empty() || address == "0" {
        return Ok(None);
    }

    let invalid = || Error::Configuration(format!("invalid bind address `{address}`"));

    if let Some(port) = address.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|_| invalid())?;
        return Ok(Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)));
    }
    if let Some(port) = address.strip_prefix("localhost:") {
        let port: u16 = port.parse().map_err(|_| invalid())?;
        return Ok(Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)));
    }
    address.parse().map(Some).map_err(|_| invalid())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
