// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes API access used by the reconciliation core.
//!
//! The core never talks to [`kube::Api`] directly. It goes through the
//! [`ClusterClient`] trait, which exposes the three verbs it needs (get,
//! create, replace) for any namespaced resource. [`KubeClusterClient`] is the
//! production implementation; unit tests use an in-memory fake.

use crate::constants::FIELD_MANAGER;
use crate::errors::Error;
use async_trait::async_trait;
use kube::api::PostParams;
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Namespace and name of an object.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespacedName {
    /// Namespace of the object
    pub namespace: String,
    /// Name of the object
    pub name: String,
}

impl NamespacedName {
    /// Creates a namespaced name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity of a namespaced object. The namespace is empty if unset.
    pub fn of<K: ResourceExt>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Bounds shared by every namespaced resource the operator reads or writes.
pub trait KubeObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> KubeObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Minimal cluster API surface used by the reconciliation core.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetches an object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the object does not exist and
    /// [`Error::Upstream`] for any other failure.
    async fn get<K: KubeObject>(&self, id: &NamespacedName) -> Result<K, Error>;

    /// Creates an object in its own namespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] if the API call fails.
    async fn create<K: KubeObject>(&self, obj: &K) -> Result<K, Error>;

    /// Replaces an existing object. `obj` must carry the `resourceVersion` it was read at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] if the API call fails, including conflicts.
    async fn replace<K: KubeObject>(&self, obj: &K) -> Result<K, Error>;
}

/// [`ClusterClient`] backed by a [`kube::Client`].
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Wraps a Kubernetes client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The wrapped Kubernetes client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    fn api<K: KubeObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn post_params() -> PostParams {
    let mut params = PostParams::default();
    params.field_manager = Some(FIELD_MANAGER.to_string());
    params
}

fn upstream<K: KubeObject>(operation: &'static str, id: &NamespacedName, err: kube::Error) -> Error {
    Error::Upstream {
        operation,
        kind: K::kind(&()).to_string(),
        namespace: id.namespace.clone(),
        name: id.name.clone(),
        source: Box::new(err),
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn get<K: KubeObject>(&self, id: &NamespacedName) -> Result<K, Error> {
        self.api::<K>(&id.namespace)
            .get_opt(&id.name)
            .await
            .map_err(|e| upstream::<K>("get", id, e))?
            .ok_or_else(|| Error::NotFound {
                kind: K::kind(&()).to_string(),
                namespace: id.namespace.clone(),
                name: id.name.clone(),
            })
    }

    async fn create<K: KubeObject>(&self, obj: &K) -> Result<K, Error> {
        let id = NamespacedName::of(obj);
        self.api::<K>(&id.namespace)
            .create(&post_params(), obj)
            .await
            .map_err(|e| upstream::<K>("create", &id, e))
    }

    async fn replace<K: KubeObject>(&self, obj: &K) -> Result<K, Error> {
        let id = NamespacedName::of(obj);
        self.api::<K>(&id.namespace)
            .replace(&id.name, &post_params(), obj)
            .await
            .map_err(|e| upstream::<K>("replace", &id, e))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
