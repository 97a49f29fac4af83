// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! cert-manager integration.
//!
//! Writes one `Certificate` per route, cloned from the configured template.
//! The certificate is named after the secret it produces (the route's TLS
//! secret, or `<route>-tls`) and covers every host of the route.

use crate::cancel::CycleToken;
use crate::client::ClusterClient;
use crate::config::CertificateTemplate;
use crate::constants::INTEGRATION_CERT_MANAGER;
use crate::crd::{Certificate, IngressRoute};
use crate::errors::Error;
use crate::hosts::IngressInfo;
use crate::integrations::{Integration, ResourceKind, WatchedObject};
use crate::reconcilers::resources::{
    controller_owner_ref, create_or_update, set_controller_reference, UpsertOutcome,
};
use async_trait::async_trait;
use kube::ResourceExt;
use tracing::debug;

/// Keeps a `Certificate` in sync with the hosts of a route.
#[derive(Clone, Debug)]
pub struct CertManager {
    template: CertificateTemplate,
}

impl CertManager {
    /// Creates the integration from a certificate template.
    #[must_use]
    pub fn new(template: CertificateTemplate) -> Self {
        Self { template }
    }

    fn apply_template(
        &self,
        certificate: &mut Certificate,
        secret_name: &str,
        dns_names: &[String],
    ) {
        if let Some(labels) = &self.template.metadata.labels {
            certificate
                .labels_mut()
                .extend(labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(annotations) = &self.template.metadata.annotations {
            certificate
                .annotations_mut()
                .extend(annotations.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        certificate.spec.clone_from(&self.template.spec);
        certificate.spec.secret_name = secret_name.to_string();
        certificate.spec.dns_names = Some(dns_names.to_vec());
    }
}

#[async_trait]
impl Integration for CertManager {
    fn name(&self) -> &'static str {
        INTEGRATION_CERT_MANAGER
    }

    fn owned_resource(&self) -> ResourceKind {
        ResourceKind::Certificate
    }

    fn watched_object(&self) -> Option<WatchedObject> {
        None
    }

    async fn update_resource<C: ClusterClient>(
        &self,
        cycle: &CycleToken,
        client: &C,
        route: &IngressRoute,
        info: &IngressInfo,
    ) -> Result<Option<UpsertOutcome>, Error> {
        if info.hosts.is_empty() {
            debug!(route = %route.name_any(), "No hosts, skipping certificate");
            return Ok(None);
        }

        let owner = controller_owner_ref(route)?;
        let secret_name = info.certificate_secret_name(route);
        let dns_names: Vec<String> = info.hosts.iter().cloned().collect();

        let mut fresh = Certificate::new(&secret_name, self.template.spec.clone());
        fresh.metadata.namespace = route.namespace();

        let outcome = create_or_update(client, cycle, fresh, |certificate| {
            self.apply_template(certificate, &secret_name, &dns_names);
            set_controller_reference(certificate, &owner)
        })
        .await?;
        Ok(Some(outcome))
    }
}

#[cfg(test)]
#[path = "cert_manager_tests.rs"]
mod cert_manager_tests;
