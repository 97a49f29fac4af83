// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `IngressRoute` resources.
//!
//! Switchboard follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor `IngressRoute` changes, owned secondary resources and
//!    the external-dns target `Service`
//! 2. **Reconcile** - Derive the hosts of the route and run every integration
//! 3. **Update** - Create or update the `Certificate` and `DNSEndpoint`
//!
//! # Modules
//!
//! - [`ingressroute`] - The per-route reconciliation cycle
//! - [`mapping`] - Reverse mapping from watched dependencies to routes
//! - [`resources`] - Create-or-update and owner reference helpers

pub mod ingressroute;
pub mod mapping;
pub mod resources;

pub use ingressroute::{IngressRouteReconciler, IntegrationStatus, ReconcileOutcome};
