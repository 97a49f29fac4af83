// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource types read and written by Switchboard.
//!
//! None of these CRDs is owned by Switchboard: they are installed by Traefik,
//! cert-manager and external-dns respectively. The types below only model the
//! fields the operator reads or writes. Unknown fields are ignored on read, except
//! in [`CertificateSpec`], which carries them through unchanged.
//!
//! # Resource Types
//!
//! - [`IngressRoute`] - Traefik HTTP router (primary resource, read-only)
//! - [`Certificate`] - cert-manager certificate request (owned)
//! - [`DNSEndpoint`] - external-dns record set (owned)
//!
//! # Example: An IngressRoute with TLS domains
//!
//! ```rust
//! use switchboard::crd::{Domain, IngressRouteSpec, Route, Tls};
//!
//! let spec = IngressRouteSpec {
//!     entry_points: Some(vec!["websecure".to_string()]),
//!     routes: vec![Route {
//!         kind: "Rule".to_string(),
//!         match_expression: "Host(`app.example.com`)".to_string(),
//!         ..Default::default()
//!     }],
//!     tls: Some(Tls {
//!         secret_name: Some("app-tls".to_string()),
//!         domains: Some(vec![Domain {
//!             main: "example.com".to_string(),
//!             sans: Some(vec!["*.example.com".to_string()]),
//!         }]),
//!         ..Default::default()
//!     }),
//! };
//! ```

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Traefik IngressRoute
// ============================================================================

/// `IngressRoute` is the Traefik CRD describing an HTTP router.
///
/// # Example
///
/// ```yaml
/// apiVersion: traefik.io/v1alpha1
/// kind: IngressRoute
/// metadata:
///   name: web
///   annotations:
///     kubernetes.io/ingress.class: traefik
/// spec:
///   entryPoints: [websecure]
///   routes:
///     - kind: Rule
///       match: Host(`web.example.com`) && PathPrefix(`/api`)
///       services:
///         - name: web
///           port: 80
///   tls:
///     secretName: web-tls
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "traefik.io",
    version = "v1alpha1",
    kind = "IngressRoute",
    namespaced,
    doc = "IngressRoute is the CRD implementation of a Traefik HTTP router."
)]
#[serde(rename_all = "camelCase")]
pub struct IngressRouteSpec {
    /// Entry points this router listens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_points: Option<Vec<String>>,

    /// Routing rules, evaluated by Traefik.
    #[serde(default)]
    pub routes: Vec<Route>,

    /// TLS configuration of the router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<Tls>,
}

/// A single Traefik routing rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Kind of the rule. Only `Rule` carries a match expression.
    pub kind: String,

    /// Traefik rule expression, e.g. ``Host(`a.com`) && PathPrefix(`/x`)``.
    #[serde(rename = "match")]
    pub match_expression: String,

    /// Rule priority used by Traefik to disambiguate overlapping rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    /// Backends receiving the traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<RouteService>>,

    /// Middlewares applied to the traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middlewares: Option<Vec<MiddlewareRef>>,
}

/// Backend service of a route.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteService {
    /// Name of the Kubernetes service (or Traefik service).
    pub name: String,

    /// Namespace of the service, defaults to the route namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Kind of the backend (`Service` or `TraefikService`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Service port, by number or name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<IntOrString>,

    /// Weight for weighted round robin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

/// Reference to a Traefik middleware.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MiddlewareRef {
    /// Middleware name.
    pub name: String,

    /// Middleware namespace, defaults to the route namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// TLS configuration of an `IngressRoute`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tls {
    /// Secret holding the certificate served for this router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    /// Traefik TLS options reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ObjectRef>,

    /// Traefik TLS store reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<ObjectRef>,

    /// Traefik certificate resolver (ACME) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_resolver: Option<String>,

    /// Explicit domains the certificate must cover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<Domain>>,
}

/// A certificate domain: one main name plus subject alternative names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Domain {
    /// Main domain name.
    #[serde(default)]
    pub main: String,

    /// Subject alternative names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sans: Option<Vec<String>>,
}

/// Namespaced reference to a Traefik object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectRef {
    /// Object name.
    pub name: String,

    /// Object namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

// ============================================================================
// cert-manager Certificate
// ============================================================================

/// `Certificate` requests a signed X.509 certificate from a cert-manager issuer.
///
/// Switchboard clones a configured template and fills in `dnsNames` and
/// `secretName` from the owning `IngressRoute`.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "Certificate",
    namespaced,
    doc = "Certificate requests a signed X.509 certificate from a cert-manager issuer."
)]
#[kube(status = "CertificateStatus")]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Secret the signed certificate is stored in.
    #[serde(default)]
    pub secret_name: String,

    /// DNS subject alternative names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_names: Option<Vec<String>>,

    /// Common name of the certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// Issuer signing the certificate.
    pub issuer_ref: IssuerRef,

    /// Requested lifetime, as a Go duration string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// How long before expiry the certificate is renewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_before: Option<String>,

    /// Key usages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usages: Option<Vec<String>>,

    /// Private key settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<CertificatePrivateKey>,

    /// Labels and annotations copied onto the generated secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_template: Option<SecretTemplate>,

    /// Every other `spec` field (`subject`, `ipAddresses`, `isCA`, `keystores`, ...),
    /// kept verbatim so templates and replaced objects do not lose them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Reference to a cert-manager `Issuer` or `ClusterIssuer`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IssuerRef {
    /// Issuer name.
    pub name: String,

    /// `Issuer` or `ClusterIssuer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// API group of the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Private key options of a certificate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePrivateKey {
    /// `RSA`, `ECDSA` or `Ed25519`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    /// Key size in bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,

    /// `PKCS1` or `PKCS8`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// `Never` or `Always`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_policy: Option<String>,
}

/// Metadata copied onto the secret cert-manager writes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SecretTemplate {
    /// Secret labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Secret annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Observed state of a certificate, written by cert-manager.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatus {
    /// Status conditions (`Ready`, `Issuing`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<CertificateCondition>>,

    /// Expiry of the issued certificate (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<String>,
}

/// A certificate status condition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateCondition {
    /// Condition type.
    pub r#type: String,

    /// `True`, `False` or `Unknown`.
    pub status: String,

    /// Machine-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// external-dns DNSEndpoint
// ============================================================================

/// `DNSEndpoint` is a set of DNS records published by external-dns.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "externaldns.k8s.io",
    version = "v1alpha1",
    kind = "DNSEndpoint",
    namespaced,
    doc = "DNSEndpoint is a set of DNS records published by external-dns."
)]
#[kube(status = "DNSEndpointStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointSpec {
    /// Records to publish.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// A single DNS record set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully qualified hostname.
    pub dns_name: String,

    /// Record values (addresses or a canonical name).
    #[serde(default)]
    pub targets: Vec<String>,

    /// Record type (`A`, `AAAA`, `CNAME`, ...).
    pub record_type: String,

    /// Record TTL in seconds.
    #[serde(
        rename = "recordTTL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub record_ttl: Option<i64>,

    /// Identifier for weighted or multi-value policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,

    /// Free-form labels consumed by external-dns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Provider-specific properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_specific: Option<Vec<ProviderSpecificProperty>>,
}

/// Provider-specific key/value pair of an endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderSpecificProperty {
    /// Property name.
    pub name: String,

    /// Property value.
    pub value: String,
}

/// Observed state of a `DNSEndpoint`, written by external-dns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointStatus {
    /// Generation last processed by external-dns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
