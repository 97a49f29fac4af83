// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hostname derivation for `IngressRoute` resources.
//!
//! Hostnames come from two sources with a strict precedence:
//!
//! 1. The TLS block: every domain's `main` name and all of its `sans`.
//! 2. The routes: `Host(...)` arguments of every route of kind `Rule`.
//!
//! Routes are only consulted when the TLS block yields no hostname at all.

use crate::constants::{DEFAULT_TLS_SECRET_SUFFIX, ROUTE_KIND_RULE};
use crate::crd::{IngressRoute, Route, Tls};
use crate::errors::Error;
use crate::rule::parse_domains;
use kube::ResourceExt;
use std::collections::BTreeSet;

/// Collects the unique hostnames of a route, TLS domains first.
///
/// # Errors
///
/// Returns [`Error::Parse`] if a `Rule` route carries a malformed match expression.
/// Routes are not parsed at all when the TLS block already yielded hostnames.
pub fn collect_hosts(tls: Option<&Tls>, routes: &[Route]) -> Result<BTreeSet<String>, Error> {
    let mut hosts = BTreeSet::new();

    if let Some(domains) = tls.and_then(|tls| tls.domains.as_ref()) {
        for domain in domains {
            hosts.insert(domain.main.clone());
            hosts.extend(domain.sans.iter().flatten().cloned());
        }
    }

    if !hosts.is_empty() {
        return Ok(hosts);
    }

    for route in routes.iter().filter(|route| route.kind == ROUTE_KIND_RULE) {
        hosts.extend(parse_domains(&route.match_expression)?);
    }

    Ok(hosts)
}

/// Per-cycle view of an `IngressRoute` shared with every integration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngressInfo {
    /// Unique hostnames, sorted.
    pub hosts: BTreeSet<String>,
    /// TLS secret named by the route, if any.
    pub tls_secret_name: Option<String>,
}

impl IngressInfo {
    /// Derives the ingress info of a route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if a match expression is malformed.
    pub fn from_route(route: &IngressRoute) -> Result<Self, Error> {
        let tls = route.spec.tls.as_ref();
        Ok(Self {
            hosts: collect_hosts(tls, &route.spec.routes)?,
            tls_secret_name: tls.and_then(|tls| tls.secret_name.clone()),
        })
    }

    /// Secret name for the certificate of `route`: the TLS secret name, or
    /// `<route-name>-tls` when the route does not name one.
    #[must_use]
    pub fn certificate_secret_name(&self, route: &IngressRoute) -> String {
        self.tls_secret_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{}{DEFAULT_TLS_SECRET_SUFFIX}", route.name_any()))
    }
}

#[cfg(test)]
#[path = "hosts_tests.rs"]
mod hosts_tests;
