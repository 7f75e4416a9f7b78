#![doc = include_str!("../README.md")]

mod config;
mod source;
mod telemetry;

use clap::Parser;
use config::{CliArgs, RunConfig};
use futures::StreamExt;
use reposum::SummaryService;
use telemetry::init_telemetry;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let source = source::build_source(&config)?;
    let service = SummaryService::new(source, config.service.clone())?;

    // A signal stops the service mid-run; requests still in progress then
    // resolve as terminated and are reported like any other result.
    let signal_watcher = {
        let service = service.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, terminating gracefully...");
            service.stop().await;
        })
    };

    request_summaries(&service, &config).await;
    service.stop().await;
    signal_watcher.abort();

    let stats = service.stats();
    tracing::info!(
        "Completed {} of {} requests ({} failed, {} terminated, peak {} concurrent fetches)",
        stats.completed,
        stats.requests,
        stats.fetch_failed,
        stats.terminated,
        stats.peak_fetches_inflight
    );
    Ok(())
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Summarizing {}..={} repos with {} connections and {} workers",
            config.min_repo_count,
            config.max_repo_count,
            config.service.max_connections,
            config.service.num_workers
        );
    }
}

/// Requests one summary per repository count, at most `max_in_flight` at a
/// time, and logs each result as it arrives.
async fn request_summaries(service: &SummaryService, config: &RunConfig) {
    futures::stream::iter(config.min_repo_count..=config.max_repo_count)
        .map(|repo_count| async move {
            tracing::info!("Requesting summary of {repo_count} repos");
            (repo_count, service.create_summary(repo_count).await)
        })
        .buffer_unordered(config.max_in_flight)
        .for_each(|(repo_count, res)| async move {
            match res {
                Ok(summary) => {
                    tracing::info!("Received summary of {repo_count} repos: {summary}");
                }
                Err(e) => {
                    tracing::error!("Summary of {repo_count} repos failed: {e}");
                }
            }
        })
        .await;
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
