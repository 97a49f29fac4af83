// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reverse mapping from a watched dependency to the routes that read it.
//!
//! When the external-dns target `Service` changes, every route the
//! external-dns integration acts on must be reconciled again so that its
//! records follow the new addresses.
//!
//! # Example
//!
//! ```rust,no_run
//! use switchboard::client::NamespacedName;
//! use switchboard::crd::IngressRoute;
//! use switchboard::integrations::ResourceKind;
//! use switchboard::reconcilers::ingressroute::IngressRouteReconciler;
//! use switchboard::reconcilers::mapping::routes_for_dependency;
//! use kube::runtime::reflector::Store;
//!
//! # fn example(store: Store<IngressRoute>, reconciler: IngressRouteReconciler) {
//! let changed = NamespacedName::new("kube-system", "traefik");
//! for route in routes_for_dependency(&store, ResourceKind::Service, &changed, &reconciler) {
//!     println!("requeue {}", route.name);
//! }
//! # }
//! ```

use crate::client::NamespacedName;
use crate::crd::IngressRoute;
use crate::integrations::{Integration, ResourceKind};
use crate::reconcilers::ingressroute::IngressRouteReconciler;
use kube::runtime::reflector::{ObjectRef, Store};
use kube::ResourceExt;

/// Routes to reconcile after the object `changed` of kind `kind` changed.
///
/// A route is returned when some integration watches exactly that object and
/// the route is selected both globally and for that integration.
#[must_use]
pub fn routes_for_dependency(
    store: &Store<IngressRoute>,
    kind: ResourceKind,
    changed: &NamespacedName,
    reconciler: &IngressRouteReconciler,
) -> Vec<ObjectRef<IngressRoute>> {
    let dependents: Vec<&'static str> = reconciler
        .integrations()
        .iter()
        .filter(|integration| {
            integration
                .watched_object()
                .is_some_and(|watched| watched.kind == kind && &watched.id == changed)
        })
        .map(|integration| integration.name())
        .collect();
    if dependents.is_empty() {
        return Vec::new();
    }

    let selector = reconciler.selector();
    store
        .state()
        .iter()
        .filter(|route| {
            let annotations = route.annotations();
            selector.matches(annotations)
                && dependents
                    .iter()
                    .any(|name| selector.matches_integration(annotations, name))
        })
        .map(|route| ObjectRef::from_obj(&**route))
        .collect()
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod mapping_tests;
