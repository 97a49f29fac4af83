// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `external_dns.rs`

use crate::cancel::CycleToken;
use crate::client::NamespacedName;
use crate::crd::{DNSEndpoint, Endpoint};
use crate::errors::Error;
use crate::hosts::IngressInfo;
use crate::integrations::external_dns::{build_endpoints, ExternalDns};
use crate::integrations::{Integration, ResourceKind, WatchedObject};
use crate::reconcilers::resources::UpsertOutcome;
use crate::target::Target;
use crate::testing::{ingress_route, InMemoryClient};
use kube::ResourceExt;
use std::collections::BTreeSet;

fn hosts(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn targets(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn test_ipv4_targets_become_a_records() {
    let endpoints = build_endpoints(&hosts(&["svc.example.com"]), &targets(&["9.9.9.9"]));

    assert_eq!(
        endpoints,
        vec![Endpoint {
            dns_name: "svc.example.com".to_string(),
            targets: targets(&["9.9.9.9"]),
            record_type: "A".to_string(),
            record_ttl: Some(300),
            ..Default::default()
        }]
    );
}

#[test]
fn test_mixed_targets_are_split_by_record_type() {
    let endpoints = build_endpoints(
        &hosts(&["b.example.com", "a.example.com"]),
        &targets(&["1.1.1.1", "2001:db8::1", "2.2.2.2"]),
    );

    let summary: Vec<(&str, &str, Vec<String>)> = endpoints
        .iter()
        .map(|e| (e.dns_name.as_str(), e.record_type.as_str(), e.targets.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a.example.com", "A", targets(&["1.1.1.1", "2.2.2.2"])),
            ("a.example.com", "AAAA", targets(&["2001:db8::1"])),
            ("b.example.com", "A", targets(&["1.1.1.1", "2.2.2.2"])),
            ("b.example.com", "AAAA", targets(&["2001:db8::1"])),
        ]
    );
}

#[test]
fn test_hostname_target_becomes_cname() {
    let endpoints = build_endpoints(&hosts(&["svc.example.com"]), &targets(&["lb.example.net"]));

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].record_type, "CNAME");
    assert_eq!(endpoints[0].targets, targets(&["lb.example.net"]));
}

#[test]
fn test_no_hosts_or_no_targets_yield_no_records() {
    assert!(build_endpoints(&hosts(&[]), &targets(&["1.1.1.1"])).is_empty());
    assert!(build_endpoints(&hosts(&["a.example.com"]), &[]).is_empty());
}

#[test]
fn test_descriptor() {
    let static_target = ExternalDns::new(Target::Static(targets(&["1.1.1.1"])));
    assert_eq!(static_target.name(), "external-dns");
    assert_eq!(static_target.owned_resource(), ResourceKind::DnsEndpoint);
    assert_eq!(static_target.watched_object(), None);

    let id = NamespacedName::new("kube-system", "traefik");
    let service_target = ExternalDns::new(Target::Service(id.clone()));
    assert_eq!(
        service_target.watched_object(),
        Some(WatchedObject {
            kind: ResourceKind::Service,
            id,
        })
    );
}

#[tokio::test]
async fn test_update_resource_writes_owned_endpoint() {
    let client = InMemoryClient::new();
    let integration = ExternalDns::new(Target::Static(targets(&["9.9.9.9"])));
    let route = ingress_route("web", &["Host(`svc.example.com`)"]);
    let info = IngressInfo::from_route(&route).unwrap();

    let outcome = integration
        .update_resource(&CycleToken::new(), &client, &route, &info)
        .await
        .unwrap();

    assert_eq!(outcome, Some(UpsertOutcome::Created));
    let endpoint: DNSEndpoint = client.object("apps", "web").unwrap();
    assert_eq!(endpoint.spec.endpoints.len(), 1);
    assert_eq!(endpoint.spec.endpoints[0].dns_name, "svc.example.com");
    let owners = endpoint.owner_references();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].uid, "web-uid");
    assert_eq!(owners[0].controller, Some(true));
}

#[tokio::test]
async fn test_update_resource_with_missing_service_fails() {
    let client = InMemoryClient::new();
    let integration = ExternalDns::new(Target::Service(NamespacedName::new(
        "kube-system",
        "traefik",
    )));
    let route = ingress_route("web", &["Host(`svc.example.com`)"]);
    let info = IngressInfo::from_route(&route).unwrap();

    let err = integration
        .update_resource(&CycleToken::new(), &client, &route, &info)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(client.writes(), 0);
}

#[tokio::test]
async fn test_update_resource_requires_route_uid() {
    let client = InMemoryClient::new();
    let integration = ExternalDns::new(Target::Static(targets(&["9.9.9.9"])));
    let mut route = ingress_route("web", &["Host(`svc.example.com`)"]);
    route.metadata.uid = None;
    let info = IngressInfo::from_route(&route).unwrap();

    let err = integration
        .update_resource(&CycleToken::new(), &client, &route, &info)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidResource { .. }));
    assert_eq!(client.writes(), 0);
}

#[tokio::test]
async fn test_empty_hosts_still_write_empty_endpoint() {
    let client = InMemoryClient::new();
    let integration = ExternalDns::new(Target::Static(targets(&["9.9.9.9"])));
    let route = ingress_route("web", &[]);
    let info = IngressInfo::from_route(&route).unwrap();

    integration
        .update_resource(&CycleToken::new(), &client, &route, &info)
        .await
        .unwrap();

    let endpoint: DNSEndpoint = client.object("apps", "web").unwrap();
    assert!(endpoint.spec.endpoints.is_empty());
}
