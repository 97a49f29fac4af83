// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use kube::Client;
use std::path::PathBuf;
use std::sync::Arc;
use switchboard::{
    client::KubeClusterClient,
    config::{parse_bind_address, Config},
    constants::TOKIO_WORKER_THREADS,
    context::Context,
    controller::run_controller,
    http::{self, Readiness},
    leader,
    reconcilers::IngressRouteReconciler,
};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Keeps cert-manager certificates and external-dns records in sync with Traefik `IngressRoutes`.
#[derive(Debug, Parser)]
#[command(name = "switchboard", version, about)]
struct Args {
    /// Path to the YAML configuration file; built-in defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("switchboard-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

/// Initializes logging.
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO level.
/// `RUST_LOG_FORMAT=json` switches to JSON output.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Cancels `shutdown` on SIGINT or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
        () = shutdown.cancelled() => return,
    }
    shutdown.cancel();
}

async fn async_main(args: Args) -> Result<()> {
    init_tracing();

    info!("Starting Switchboard IngressRoute controller");

    let config = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            Config::load(path)?
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };
    config.validate()?;
    let reconciler = IngressRouteReconciler::from_config(&config)?;
    if reconciler.integrations().is_empty() {
        info!("No integrations configured, routes will only be observed");
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let readiness = Readiness::new();
    let mut servers = JoinSet::new();
    if let Some(address) = parse_bind_address(&config.metrics.bind_address)? {
        servers.spawn(http::serve(
            "metrics",
            address,
            http::metrics_router(),
            shutdown.clone(),
        ));
    }
    if let Some(address) = parse_bind_address(&config.health.health_probe_bind_address)? {
        servers.spawn(http::serve(
            "health",
            address,
            http::health_router(readiness.clone()),
            shutdown.clone(),
        ));
    }

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");
    readiness.mark_ready();

    let mut leadership = if config.leader_election.leader_elect {
        match leader::acquire(client.clone(), &config.leader_election, &shutdown).await? {
            Some(leadership) => Some(leadership),
            None => return drain(servers).await,
        }
    } else {
        None
    };

    let ctx = Arc::new(Context::new(
        KubeClusterClient::new(client),
        reconciler,
        shutdown.clone(),
        &config.controller,
    ));

    let lost = async {
        match leadership.as_mut() {
            Some(leadership) => leadership.lost().await,
            None => std::future::pending().await,
        }
    };

    // The controller only returns on shutdown; anything else ending first is fatal.
    let result = tokio::select! {
        result = run_controller(ctx) => result,
        Some(result) = servers.join_next() => {
            error!("CRITICAL: HTTP server exited unexpectedly: {:?}", result);
            match result {
                Ok(Ok(())) => Err(anyhow::anyhow!("HTTP server exited unexpectedly")),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(e.into()),
            }
        }
        () = lost => Err(anyhow::anyhow!("leader lease lost")),
    };
    shutdown.cancel();

    if let Some(leadership) = leadership {
        leadership.release().await;
    }
    result?;
    drain(servers).await
}

/// Waits for every HTTP server to stop.
async fn drain(mut servers: JoinSet<Result<()>>) -> Result<()> {
    while let Some(result) = servers.join_next().await {
        result??;
    }
    info!("Switchboard stopped");
    Ok(())
}
