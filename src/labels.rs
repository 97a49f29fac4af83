// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotation keys and values read from `IngressRoute` resources.
//!
//! The keys are part of the operator's public contract and must stay bit-exact:
//! existing routes in the wild carry them.

// ============================================================================
// Kubernetes Standard Annotations
// ============================================================================

/// Ingress class of a route, compared against the configured selector class
pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";

// ============================================================================
// Switchboard-Specific Annotations
// ============================================================================

/// Opt-out annotation.
///
/// Either [`IGNORE_ALL_TRUE`] / [`IGNORE_ALL`] to exclude the route entirely, or a
/// comma-separated list of integration names to exclude selectively.
pub const IGNORE_ANNOTATION: &str = "github.sanjivmadhavan.io/ignore";

/// Ignore-annotation value that opts a route out of every integration
pub const IGNORE_ALL_TRUE: &str = "true";

/// Alternative spelling of [`IGNORE_ALL_TRUE`]
pub const IGNORE_ALL: &str = "all";

/// Separator of integration names in the ignore annotation
pub const IGNORE_LIST_SEPARATOR: char = ',';
