// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Switchboard operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group of Traefik `IngressRoute` resources
pub const TRAEFIK_API_GROUP: &str = "traefik.io";

/// API group of cert-manager `Certificate` resources
pub const CERT_MANAGER_API_GROUP: &str = "cert-manager.io";

/// API group of external-dns `DNSEndpoint` resources
pub const EXTERNAL_DNS_API_GROUP: &str = "externaldns.k8s.io";

/// Kind name for the primary `IngressRoute` resource
pub const KIND_INGRESS_ROUTE: &str = "IngressRoute";

/// Kind name for cert-manager `Certificate` resources
pub const KIND_CERTIFICATE: &str = "Certificate";

/// Kind name for external-dns `DNSEndpoint` resources
pub const KIND_DNS_ENDPOINT: &str = "DNSEndpoint";

/// Kind name for core `Service` resources
pub const KIND_SERVICE: &str = "Service";

/// Field manager used for every write issued by the operator
pub const FIELD_MANAGER: &str = "switchboard-controller";

// ============================================================================
// Routing Rule Constants
// ============================================================================

/// The only route kind whose match expression is inspected for hosts
pub const ROUTE_KIND_RULE: &str = "Rule";

/// Rule matcher whose arguments are hostnames
pub const HOST_MATCHER: &str = "Host";

// ============================================================================
// Integration Constants
// ============================================================================

/// Name of the external-dns integration, as used in the ignore annotation
pub const INTEGRATION_EXTERNAL_DNS: &str = "external-dns";

/// Name of the cert-manager integration, as used in the ignore annotation
pub const INTEGRATION_CERT_MANAGER: &str = "cert-manager";

/// TTL for every DNS endpoint written by the external-dns integration (5 minutes)
pub const DEFAULT_DNS_RECORD_TTL_SECS: i64 = 300;

/// Suffix for the certificate secret when the route does not name one
pub const DEFAULT_TLS_SECRET_SUFFIX: &str = "-tls";

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Deadline for a single reconciliation cycle (30 seconds)
pub const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Leader Election Constants
// ============================================================================

/// Default leader election lease name
pub const DEFAULT_LEASE_NAME: &str = "switchboard-leader";

/// Default leader election lease duration (15 seconds)
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

/// Default leader election grace period (5 seconds)
pub const DEFAULT_LEASE_GRACE_SECS: u64 = 5;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics / Health Server Constants
// ============================================================================

/// Default bind address for the Prometheus metrics HTTP server
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = ":8080";

/// Default bind address for the health probe HTTP server
pub const DEFAULT_HEALTH_BIND_ADDRESS: &str = ":8081";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness probe
pub const HEALTHZ_PATH: &str = "/healthz";

/// Path for the readiness probe
pub const READYZ_PATH: &str = "/readyz";
