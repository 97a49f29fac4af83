// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Switchboard - Traefik `IngressRoute` companion operator for Kubernetes
//!
//! Switchboard watches Traefik `IngressRoute` resources and keeps the
//! resources other controllers act on in sync with them:
//!
//! - a cert-manager `Certificate` covering every host of the route
//! - an external-dns `DNSEndpoint` pointing every host at the ingress
//!
//! ## Modules
//!
//! - [`crd`] - Resource types for `IngressRoute`, `Certificate` and `DNSEndpoint`
//! - [`rule`] - Parser for Traefik routing rules
//! - [`hosts`] - Host collection from TLS domains and routing rules
//! - [`selector`] - Ingress class and opt-out annotation matching
//! - [`target`] - DNS target resolution from static addresses or a `Service`
//! - [`integrations`] - The cert-manager and external-dns integrations
//! - [`reconcilers`] - The per-route reconciliation cycle and reverse mapping
//! - [`controller`] - kube-rs controller wiring
//! - [`config`] - YAML configuration
//! - [`leader`] - Lease-based leader election
//! - [`http`] - Metrics and health probe listeners
//!
//! ## Example
//!
//! ```rust,no_run
//! use switchboard::hosts::collect_hosts;
//! use switchboard::crd::Route;
//!
//! let route = Route {
//!     kind: "Rule".to_string(),
//!     match_expression: "Host(`a.example.com`) || Host(`b.example.com`)".to_string(),
//!     ..Route::default()
//! };
//! let hosts = collect_hosts(None, &[route]).unwrap();
//! assert_eq!(hosts.len(), 2);
//! ```
//!
//! ## Annotations
//!
//! - `kubernetes.io/ingress.class` - must match the configured ingress class
//! - `github.sanjivmadhavan.io/ignore` - `true`/`all` skips the route, a
//!   comma-separated list of integration names skips those integrations

pub mod cancel;
pub mod client;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod hosts;
pub mod http;
pub mod integrations;
pub mod labels;
pub mod leader;
pub mod metrics;
pub mod reconcilers;
pub mod rule;
pub mod selector;
pub mod target;

#[cfg(test)]
pub(crate) mod testing;
