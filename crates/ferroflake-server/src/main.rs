#![doc = include_str!("../README.md")]

mod server;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ferroflake::{LockIdGenerator, SystemClock};
use server::config::{CliArgs, ServerConfig};
use server::service::Generator;
use server::telemetry::init_telemetry;
use server::{http, memcache};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_telemetry()?;

    let machine_id = match config.machine_id {
        Some(id) => id,
        None => ferroflake::resolve().context("failed to derive machine id; set MACHINE_ID")?,
    };
    let clock = SystemClock::with_epoch(config.epoch).context("invalid EPOCH_MILLIS")?;
    let generator: Arc<Generator> = Arc::new(
        LockIdGenerator::with_tick(machine_id, clock, config.tick).context("invalid TICK_MILLIS")?,
    );

    let http_listener = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("failed to bind HTTP on {}", config.http_addr))?;
    let memcache_listener = TcpListener::bind(config.memcache_addr)
        .await
        .with_context(|| format!("failed to bind memcache on {}", config.memcache_addr))?;

    log_startup_info(machine_id, &config);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let (http_result, memcache_result) = tokio::join!(
        tokio::spawn(http::serve(
            http_listener,
            Arc::clone(&generator),
            shutdown.clone(),
        )),
        tokio::spawn(memcache::serve(
            memcache_listener,
            generator,
            config.max_line_length,
            shutdown,
        )),
    );

    memcache_result.context("memcache front panicked")?;
    http_result
        .context("HTTP front panicked")?
        .context("HTTP front failed")?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(machine_id: u16, config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(machine_id, "Starting ID service with full config: {config:#?}");
    } else {
        tracing::info!(
            machine_id,
            http = %config.http_addr,
            memcache = %config.memcache_addr,
            "Starting ID service"
        );
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        () = shutdown.cancelled() => return,
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
    shutdown.cancel();
}
