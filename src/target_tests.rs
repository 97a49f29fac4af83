// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `target.rs`

use crate::cancel::CycleToken;
use crate::client::NamespacedName;
use crate::errors::Error;
use crate::target::{targets_from_service, Target};
use crate::testing::InMemoryClient;
use k8s_openapi::api::core::v1::{
    LoadBalancerIngress, LoadBalancerStatus, Service, ServiceSpec, ServiceStatus,
};
use kube::api::ObjectMeta;

fn service(cluster_ips: &[&str], ingress: Vec<LoadBalancerIngress>) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some("traefik".to_string()),
            namespace: Some("kube-system".to_string()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            cluster_ips: Some(cluster_ips.iter().map(|ip| (*ip).to_string()).collect()),
            ..Default::default()
        }),
        status: Some(ServiceStatus {
            load_balancer: Some(LoadBalancerStatus {
                ingress: Some(ingress),
            }),
            ..Default::default()
        }),
    }
}

fn ip(ip: &str) -> LoadBalancerIngress {
    LoadBalancerIngress {
        ip: Some(ip.to_string()),
        ..Default::default()
    }
}

fn hostname(hostname: &str) -> LoadBalancerIngress {
    LoadBalancerIngress {
        hostname: Some(hostname.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_load_balancer_hostname_wins_exclusively() {
    let svc = service(&["10.0.0.1"], vec![ip("1.2.3.4"), hostname("lb.example.com"), ip("5.6.7.8")]);

    assert_eq!(targets_from_service(&svc), vec!["lb.example.com"]);
}

#[test]
fn test_load_balancer_ips_are_collected() {
    let svc = service(&["10.0.0.1"], vec![ip("1.2.3.4"), ip("2001:db8::1")]);

    assert_eq!(targets_from_service(&svc), vec!["1.2.3.4", "2001:db8::1"]);
}

#[test]
fn test_falls_back_to_cluster_ips() {
    let svc = service(&["10.0.0.1", "fd00::1"], vec![]);

    assert_eq!(targets_from_service(&svc), vec!["10.0.0.1", "fd00::1"]);
}

#[test]
fn test_empty_ingress_entries_are_skipped() {
    let svc = service(&["10.0.0.1"], vec![LoadBalancerIngress::default(), hostname("")]);

    assert_eq!(targets_from_service(&svc), vec!["10.0.0.1"]);
}

#[test]
fn test_single_cluster_ip_field_is_used_when_list_missing() {
    let svc = Service {
        spec: Some(ServiceSpec {
            cluster_ip: Some("10.0.0.9".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };

    assert_eq!(targets_from_service(&svc), vec!["10.0.0.9"]);
}

#[test]
fn test_service_without_spec_or_status_has_no_targets() {
    assert!(targets_from_service(&Service::default()).is_empty());
}

#[tokio::test]
async fn test_static_target_is_returned_verbatim() {
    let client = InMemoryClient::new();
    let target = Target::Static(vec!["9.9.9.9".to_string(), "2001:db8::9".to_string()]);

    let targets = target.targets(&client, &CycleToken::new()).await.unwrap();

    assert_eq!(targets, vec!["9.9.9.9", "2001:db8::9"]);
    assert!(target.namespaced_name().is_none());
    assert_eq!(client.gets.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_service_target_looks_up_service() {
    let client = InMemoryClient::new();
    client.insert(service(&["10.0.0.1"], vec![ip("1.2.3.4")]));
    let id = NamespacedName::new("kube-system", "traefik");
    let target = Target::Service(id.clone());

    let targets = target.targets(&client, &CycleToken::new()).await.unwrap();

    assert_eq!(targets, vec!["1.2.3.4"]);
    assert_eq!(target.namespaced_name(), Some(&id));
}

#[tokio::test]
async fn test_missing_service_is_an_error() {
    let client = InMemoryClient::new();
    let target = Target::Service(NamespacedName::new("kube-system", "missing"));

    let err = target.targets(&client, &CycleToken::new()).await.unwrap_err();

    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn test_service_lookup_failure_is_an_error() {
    let client = InMemoryClient::new();
    client.insert(service(&["10.0.0.1"], vec![]));
    client.fail("get", "Service");
    let target = Target::Service(NamespacedName::new("kube-system", "traefik"));

    let err = target.targets(&client, &CycleToken::new()).await.unwrap_err();

    assert!(matches!(err, Error::Upstream { operation: "get", .. }));
}

#[tokio::test]
async fn test_cancelled_cycle_skips_lookup() {
    let client = InMemoryClient::new();
    client.insert(service(&["10.0.0.1"], vec![]));
    let target = Target::Service(NamespacedName::new("kube-system", "traefik"));
    let cycle = CycleToken::new();
    cycle.cancel();

    let err = target.targets(&client, &cycle).await.unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert_eq!(client.gets.load(std::sync::atomic::Ordering::SeqCst), 0);
}
