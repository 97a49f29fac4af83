// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lease-based leader election.
//!
//! Only one replica reconciles at a time. The controller starts once the
//! lease is held and the process exits when it is lost, letting another
//! replica take over.

use crate::config::LeaderElectionConfig;
use crate::constants::{DEFAULT_LEASE_DURATION_SECS, DEFAULT_LEASE_GRACE_SECS};
use crate::metrics;
use anyhow::{Context as _, Result};
use kube::Client;
use kube_lease_manager::{LeaseManager, LeaseManagerBuilder, LeaseManagerError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Namespace used when neither the configuration nor the environment names one
const FALLBACK_NAMESPACE: &str = "default";

/// Identity of this replica in the lease holder field.
///
/// `POD_NAME` first, then `HOSTNAME`, then a process-unique name.
pub fn resolve_identity(lookup: impl Fn(&str) -> Option<String>) -> String {
    ["POD_NAME", "HOSTNAME"]
        .into_iter()
        .filter_map(lookup)
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| format!("switchboard-{}", std::process::id()))
}

/// Namespace of the lease: configured, then `POD_NAMESPACE`, then `default`.
pub fn resolve_namespace(
    config: &LeaderElectionConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    config
        .resource_namespace
        .clone()
        .filter(|ns| !ns.is_empty())
        .or_else(|| lookup("POD_NAMESPACE").filter(|ns| !ns.is_empty()))
        .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string())
}

fn env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// A held lease.
pub struct Leadership {
    identity: String,
    channel: watch::Receiver<bool>,
    task: JoinHandle<Result<LeaseManager, LeaseManagerError>>,
}

impl Leadership {
    /// Resolves once the lease is no longer held.
    pub async fn lost(&mut self) {
        // A closed channel means the manager task ended: the lease is gone too.
        let _ = self.channel.wait_for(|leader| !*leader).await;
        warn!(identity = %self.identity, "Leader lease lost");
        metrics::record_leader_lost(&self.identity);
    }

    /// Releases the lease so another replica can take over immediately.
    pub async fn release(self) {
        drop(self.channel);
        match self.task.await {
            Ok(Ok(_)) => info!(identity = %self.identity, "Leader lease released"),
            Ok(Err(e)) => warn!(identity = %self.identity, error = %e, "Failed to release leader lease"),
            Err(e) => warn!(identity = %self.identity, error = %e, "Lease manager task failed"),
        }
    }
}

/// Waits until this replica holds the lease.
///
/// Returns `None` if `shutdown` is cancelled first.
///
/// # Errors
///
/// Returns an error if the lease manager cannot be created or stops before
/// the lease is acquired.
pub async fn acquire(
    client: Client,
    config: &LeaderElectionConfig,
    shutdown: &CancellationToken,
) -> Result<Option<Leadership>> {
    let identity = resolve_identity(env);
    let namespace = resolve_namespace(config, env);
    info!(
        lease = %config.resource_name,
        namespace = %namespace,
        identity = %identity,
        "Waiting for leader lease"
    );

    let manager = LeaseManagerBuilder::new(client, &config.resource_name)
        .with_namespace(&namespace)
        .with_identity(&identity)
        .with_duration(DEFAULT_LEASE_DURATION_SECS)
        .with_grace(DEFAULT_LEASE_GRACE_SECS)
        .build()
        .await
        .context("failed to create lease manager")?;
    let (mut channel, task) = manager.watch().await;

    let acquired = tokio::select! {
        result = channel.wait_for(|leader| *leader) => Some(result.map(|_| ())),
        () = shutdown.cancelled() => None,
    };
    match acquired {
        Some(result) => result.context("lease manager stopped before acquiring the lease")?,
        None => {
            info!("Shutdown requested while waiting for leader lease");
            drop(channel);
            let _ = task.await;
            return Ok(None);
        }
    }

    info!(identity = %identity, "Acquired leader lease");
    metrics::record_leader_elected(&identity);
    Ok(Some(Leadership {
        identity,
        channel,
        task,
    }))
}

#[cfg(test)]
#[path = "leader_tests.rs"]
mod leader_tests;
