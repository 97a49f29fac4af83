// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic create-or-update helper for secondary resources.
//!
//! Integrations describe the desired state of their resource as a mutation of
//! an existing (or freshly named) object. [`create_or_update`] fetches the
//! current object, applies the mutation and writes it back only when the
//! serialized object changed, so repeated cycles are free of writes.
//!
//! # Example
//!
//! ```rust,no_run
//! use switchboard::cancel::CycleToken;
//! use switchboard::client::KubeClusterClient;
//! use switchboard::crd::{DNSEndpoint, DNSEndpointSpec};
//! use switchboard::reconcilers::resources::create_or_update;
//! use kube::Client;
//!
//! async fn example(client: Client) -> Result<(), switchboard::errors::Error> {
//!     let client = KubeClusterClient::new(client);
//!     let mut fresh = DNSEndpoint::new("web", DNSEndpointSpec::default());
//!     fresh.metadata.namespace = Some("default".to_string());
//!
//!     create_or_update(&client, &CycleToken::new(), fresh, |endpoint| {
//!         endpoint.spec.endpoints.clear();
//!         Ok(())
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

use crate::cancel::CycleToken;
use crate::client::{ClusterClient, KubeObject, NamespacedName};
use crate::errors::Error;
use crate::metrics;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::ResourceExt;
use std::fmt;
use tracing::{debug, info};

/// What [`create_or_update`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The object did not exist and was created.
    Created,
    /// The object existed and was replaced.
    Updated,
    /// The object already had the desired state.
    Unchanged,
}

impl UpsertOutcome {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UpsertOutcome::Created => "created",
            UpsertOutcome::Updated => "updated",
            UpsertOutcome::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates `fresh` or updates the existing object of the same name.
///
/// `mutate` brings an object to the desired state. It is applied to `fresh`
/// when the object does not exist yet, otherwise to a copy of the current
/// object. The copy is only written back if it differs from what was read.
///
/// # Errors
///
/// Returns whatever the client or `mutate` return, and [`Error::Cancelled`] or
/// [`Error::DeadlineExceeded`] when the cycle is interrupted.
pub async fn create_or_update<C, K, F>(
    client: &C,
    cycle: &CycleToken,
    fresh: K,
    mutate: F,
) -> Result<UpsertOutcome, Error>
where
    C: ClusterClient,
    K: KubeObject,
    F: Fn(&mut K) -> Result<(), Error>,
{
    let id = NamespacedName::of(&fresh);
    let kind = K::kind(&()).to_string();

    let existing = match cycle
        .run(&format!("get {kind} {id}"), client.get::<K>(&id))
        .await
    {
        Ok(existing) => Some(existing),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };

    let outcome = match existing {
        None => {
            let mut obj = fresh;
            mutate(&mut obj)?;
            debug!(kind = %kind, name = %id, "Creating resource");
            cycle
                .run(&format!("create {kind} {id}"), client.create(&obj))
                .await?;
            UpsertOutcome::Created
        }
        Some(current) => {
            let mut obj = current.clone();
            mutate(&mut obj)?;
            if serialized(&current, &id)? == serialized(&obj, &id)? {
                UpsertOutcome::Unchanged
            } else {
                debug!(kind = %kind, name = %id, "Replacing resource");
                cycle
                    .run(&format!("replace {kind} {id}"), client.replace(&obj))
                    .await?;
                UpsertOutcome::Updated
            }
        }
    };

    if outcome == UpsertOutcome::Unchanged {
        debug!(kind = %kind, name = %id, "Resource already up to date");
    } else {
        info!(kind = %kind, name = %id, outcome = %outcome, "Reconciled resource");
    }
    metrics::record_resource_write(&kind, outcome.as_str());

    Ok(outcome)
}

fn serialized<K: KubeObject>(obj: &K, id: &NamespacedName) -> Result<serde_json::Value, Error> {
    serde_json::to_value(obj).map_err(|e| Error::InvalidResource {
        kind: K::kind(&()).to_string(),
        namespace: id.namespace.clone(),
        name: id.name.clone(),
        reason: format!("cannot serialize: {e}"),
    })
}

/// Controller owner reference pointing at `owner`.
///
/// # Errors
///
/// Returns [`Error::InvalidResource`] if `owner` has no uid yet and so cannot own anything.
pub fn controller_owner_ref<O: KubeObject>(owner: &O) -> Result<OwnerReference, Error> {
    owner
        .controller_owner_ref(&())
        .ok_or_else(|| Error::InvalidResource {
            kind: O::kind(&()).to_string(),
            namespace: owner.namespace().unwrap_or_default(),
            name: owner.name_any(),
            reason: "object has no uid".to_string(),
        })
}

/// Makes `owner` the controller of `obj`.
///
/// Existing non-controller references to the same owner are replaced; other
/// owner references are kept.
///
/// # Errors
///
/// Returns [`Error::InvalidResource`] if `obj` is already controlled by a different owner.
pub fn set_controller_reference<K: KubeObject>(
    obj: &mut K,
    owner: &OwnerReference,
) -> Result<(), Error> {
    let id = NamespacedName::of(obj);
    let references = obj.owner_references_mut();

    if let Some(other) = references
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != owner.uid)
    {
        return Err(Error::InvalidResource {
            kind: K::kind(&()).to_string(),
            namespace: id.namespace,
            name: id.name,
            reason: format!("already controlled by {} {}", other.kind, other.name),
        });
    }

    references.retain(|r| r.uid != owner.uid);
    references.push(owner.clone());
    Ok(())
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
