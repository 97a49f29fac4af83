// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotation-based selection of `IngressRoute` resources.
//!
//! The [`Selector`] decides two things from a route's annotations:
//!
//! 1. Whether the route is processed at all ([`Selector::matches`])
//! 2. Whether a given integration acts on it ([`Selector::matches_integration`])
//!
//! # Example
//!
//! ```rust
//! use switchboard::selector::Selector;
//! use std::collections::BTreeMap;
//!
//! let selector = Selector::new(Some("traefik".to_string()));
//! let annotations = BTreeMap::from([
//!     ("kubernetes.io/ingress.class".to_string(), "traefik".to_string()),
//!     ("github.sanjivmadhavan.io/ignore".to_string(), "cert-manager".to_string()),
//! ]);
//!
//! assert!(selector.matches(&annotations));
//! assert!(selector.matches_integration(&annotations, "external-dns"));
//! assert!(!selector.matches_integration(&annotations, "cert-manager"));
//! ```

use crate::labels::{
    IGNORE_ALL, IGNORE_ALL_TRUE, IGNORE_ANNOTATION, IGNORE_LIST_SEPARATOR,
    INGRESS_CLASS_ANNOTATION,
};
use std::collections::BTreeMap;

/// Selects routes by ingress class and honours the ignore annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    ingress_class: Option<String>,
}

impl Selector {
    /// Creates a selector requiring `kubernetes.io/ingress.class` to equal
    /// `ingress_class` when it is set.
    #[must_use]
    pub fn new(ingress_class: Option<String>) -> Self {
        Self { ingress_class }
    }

    /// The required ingress class, if any.
    #[must_use]
    pub fn ingress_class(&self) -> Option<&str> {
        self.ingress_class.as_deref()
    }

    /// Returns whether a route with these annotations is processed at all.
    #[must_use]
    pub fn matches(&self, annotations: &BTreeMap<String, String>) -> bool {
        if ignores_everything(annotations) {
            return false;
        }

        match &self.ingress_class {
            Some(required) => annotations
                .get(INGRESS_CLASS_ANNOTATION)
                .is_some_and(|class| class == required),
            None => true,
        }
    }

    /// Returns whether the integration named `integration` may act on a route
    /// with these annotations.
    #[must_use]
    pub fn matches_integration(
        &self,
        annotations: &BTreeMap<String, String>,
        integration: &str,
    ) -> bool {
        let Some(ignore) = annotations.get(IGNORE_ANNOTATION) else {
            return true;
        };
        if is_ignore_all(ignore) {
            return false;
        }
        !ignore
            .split(IGNORE_LIST_SEPARATOR)
            .any(|ignored| ignored.trim() == integration)
    }
}

fn ignores_everything(annotations: &BTreeMap<String, String>) -> bool {
    annotations
        .get(IGNORE_ANNOTATION)
        .is_some_and(|value| is_ignore_all(value))
}

fn is_ignore_all(value: &str) -> bool {
    value == IGNORE_ALL_TRUE || value == IGNORE_ALL
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod selector_tests;
