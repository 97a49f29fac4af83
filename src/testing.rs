// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ClusterClient`] used by unit tests.

use crate::client::{ClusterClient, KubeObject, NamespacedName};
use crate::errors::Error;
use async_trait::async_trait;
use kube::ResourceExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type Key = (String, String, String);

fn key<K: KubeObject>(id: &NamespacedName) -> Key {
    (
        K::kind(&()).to_string(),
        id.namespace.clone(),
        id.name.clone(),
    )
}

/// Object store keyed by kind, namespace and name.
#[derive(Default)]
pub(crate) struct InMemoryClient {
    objects: Mutex<HashMap<Key, Value>>,
    failures: Mutex<Vec<(&'static str, String)>>,
    next_version: AtomicUsize,
    pub(crate) gets: AtomicUsize,
    pub(crate) creates: AtomicUsize,
    pub(crate) replaces: AtomicUsize,
}

impl InMemoryClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `obj` as if it had been created by someone else.
    pub(crate) fn insert<K: KubeObject>(&self, mut obj: K) {
        let id = NamespacedName::of(&obj);
        self.stamp(&mut obj);
        let value = serde_json::to_value(&obj).unwrap();
        self.objects.lock().unwrap().insert(key::<K>(&id), value);
    }

    /// Reads back a stored object.
    pub(crate) fn object<K: KubeObject>(&self, namespace: &str, name: &str) -> Option<K> {
        self.objects
            .lock()
            .unwrap()
            .get(&key::<K>(&NamespacedName::new(namespace, name)))
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    /// Makes every `operation` (`get`, `create`, `replace`) on `kind` fail.
    pub(crate) fn fail(&self, operation: &'static str, kind: &str) {
        self.failures
            .lock()
            .unwrap()
            .push((operation, kind.to_string()));
    }

    pub(crate) fn writes(&self) -> usize {
        self.creates.load(Ordering::SeqCst) + self.replaces.load(Ordering::SeqCst)
    }

    fn stamp<K: KubeObject>(&self, obj: &mut K) {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
        let meta = obj.meta_mut();
        meta.resource_version = Some(version.to_string());
        if meta.uid.is_none() {
            meta.uid = Some(format!("uid-{version}"));
        }
    }

    fn check_failure<K: KubeObject>(
        &self,
        operation: &'static str,
        id: &NamespacedName,
    ) -> Result<(), Error> {
        let kind = K::kind(&()).to_string();
        let failing = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|(op, k)| *op == operation && *k == kind);
        if failing {
            return Err(upstream::<K>(operation, id, "injected failure"));
        }
        Ok(())
    }
}

fn upstream<K: KubeObject>(operation: &'static str, id: &NamespacedName, reason: &str) -> Error {
    Error::Upstream {
        operation,
        kind: K::kind(&()).to_string(),
        namespace: id.namespace.clone(),
        name: id.name.clone(),
        source: Box::new(std::io::Error::other(reason.to_string())),
    }
}

#[async_trait]
impl ClusterClient for InMemoryClient {
    async fn get<K: KubeObject>(&self, id: &NamespacedName) -> Result<K, Error> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_failure::<K>("get", id)?;
        let value = self.objects.lock().unwrap().get(&key::<K>(id)).cloned();
        match value {
            Some(value) => Ok(serde_json::from_value(value).unwrap()),
            None => Err(Error::NotFound {
                kind: K::kind(&()).to_string(),
                namespace: id.namespace.clone(),
                name: id.name.clone(),
            }),
        }
    }

    async fn create<K: KubeObject>(&self, obj: &K) -> Result<K, Error> {
        let id = NamespacedName::of(obj);
        self.check_failure::<K>("create", &id)?;
        if self.objects.lock().unwrap().contains_key(&key::<K>(&id)) {
            return Err(upstream::<K>("create", &id, "already exists"));
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        let mut created = obj.clone();
        self.stamp(&mut created);
        let value = serde_json::to_value(&created).unwrap();
        self.objects.lock().unwrap().insert(key::<K>(&id), value);
        Ok(created)
    }

    async fn replace<K: KubeObject>(&self, obj: &K) -> Result<K, Error> {
        let id = NamespacedName::of(obj);
        self.check_failure::<K>("replace", &id)?;
        let current: K = match self.objects.lock().unwrap().get(&key::<K>(&id)) {
            Some(value) => serde_json::from_value(value.clone()).unwrap(),
            None => return Err(upstream::<K>("replace", &id, "not found")),
        };
        if current.resource_version() != obj.resource_version() {
            return Err(upstream::<K>("replace", &id, "conflict"));
        }
        self.replaces.fetch_add(1, Ordering::SeqCst);
        let mut replaced = obj.clone();
        replaced.meta_mut().uid = current.uid();
        self.stamp(&mut replaced);
        let value = serde_json::to_value(&replaced).unwrap();
        self.objects.lock().unwrap().insert(key::<K>(&id), value);
        Ok(replaced)
    }
}

/// An `IngressRoute` in namespace `apps` with a uid and one `Rule` route per
/// match expression.
pub(crate) fn ingress_route(name: &str, matches: &[&str]) -> crate::crd::IngressRoute {
    use crate::crd::{IngressRoute, IngressRouteSpec, Route};

    let mut route = IngressRoute::new(
        name,
        IngressRouteSpec {
            entry_points: None,
            routes: matches
                .iter()
                .map(|expression| Route {
                    kind: "Rule".to_string(),
                    match_expression: (*expression).to_string(),
                    ..Default::default()
                })
                .collect(),
            tls: None,
        },
    );
    route.metadata.namespace = Some("apps".to_string());
    route.metadata.uid = Some(format!("{name}-uid"));
    route
}
