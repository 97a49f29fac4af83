// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the Switchboard operator.
//!
//! Every fallible operation of the reconciliation core returns [`Error`]. The variants
//! map onto how the controller runtime must treat the failure:
//!
//! - [`Error::NotFound`] - an object does not exist. For the primary `IngressRoute`
//!   this is a successful no-op; for a target `Service` it fails the cycle.
//! - [`Error::Parse`] - a route match expression is malformed. Fails the cycle.
//! - [`Error::Configuration`] - invalid operator configuration. Only raised at startup.
//! - [`Error::Upstream`] - any other Kubernetes API failure. Fails the cycle.
//! - [`Error::Cancelled`] / [`Error::DeadlineExceeded`] - the cycle token fired
//!   before an API call completed.
//! - [`Error::InvalidResource`] - the primary object cannot own the secondary one.
//!
//! The core never retries; every error surfaces to the controller's error policy.

use thiserror::Error;

/// Boxed source error of an upstream API failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while reconciling an `IngressRoute`.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested object does not exist.
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        /// Kind of the missing object
        kind: String,
        /// Namespace that was queried
        namespace: String,
        /// Name that was queried
        name: String,
    },

    /// A route match expression could not be parsed.
    #[error("failed to parse rule `{rule}`: {reason}")]
    Parse {
        /// The offending match expression
        rule: String,
        /// What the parser rejected
        reason: String,
    },

    /// The operator configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A Kubernetes API call failed for a reason other than not-found.
    #[error("failed to {operation} {kind} {namespace}/{name}: {source}")]
    Upstream {
        /// API verb (`get`, `create`, `replace`)
        operation: &'static str,
        /// Kind of the object
        kind: String,
        /// Namespace of the object
        namespace: String,
        /// Name of the object
        name: String,
        /// Underlying client error
        #[source]
        source: BoxError,
    },

    /// The cycle was cancelled while waiting on an API call.
    #[error("reconciliation cancelled during {operation}")]
    Cancelled {
        /// Operation that was interrupted
        operation: String,
    },

    /// The cycle deadline passed while waiting on an API call.
    #[error("reconciliation deadline exceeded during {operation}")]
    DeadlineExceeded {
        /// Operation that was interrupted
        operation: String,
    },

    /// The primary object cannot be used as the owner of a secondary object.
    #[error("invalid resource {kind} {namespace}/{name}: {reason}")]
    InvalidResource {
        /// Kind of the object
        kind: String,
        /// Namespace of the object
        namespace: String,
        /// Name of the object
        name: String,
        /// Why the object is unusable
        reason: String,
    },
}

impl Error {
    /// Returns `true` if this error reports a missing object.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns `true` if the cycle was interrupted by its token.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Error::Cancelled { .. } | Error::DeadlineExceeded { .. }
        )
    }

    /// Stable label for the `errors_total` metric.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Parse { .. } => "parse",
            Error::Configuration(_) => "configuration",
            Error::Upstream { .. } => "upstream",
            Error::Cancelled { .. } => "cancelled",
            Error::DeadlineExceeded { .. } => "deadline_exceeded",
            Error::InvalidResource { .. } => "invalid_resource",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
