use clap::Parser;
use jsondns_domain::CliOverrides;
use jsondns_infrastructure::jobs::CacheSweepJob;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "jsondnsd")]
#[command(version)]
#[command(about = "jsondns - DNS over UDP answered from a JSON-over-HTTP backend")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// DNS server port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Backend host serving JSON answers (host or host:port)
    #[arg(long)]
    backend: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Append logs to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.port,
        bind_address: cli.bind.clone(),
        backend_host: cli.backend.clone(),
        log_level: cli.log_level.clone(),
        log_file: cli.log_file.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting jsondns gateway v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        bind = %config.server.bind_address,
        dns_port = config.server.dns_port,
        backend = %config.backend.host,
        max_payload = config.server.max_payload,
        "Configuration loaded"
    );

    let services = di::GatewayServices::new(&config);
    let shutdown = CancellationToken::new();

    if let Some(cache) = &services.cache {
        if config.cache.sweep_interval > 0 {
            let sweep_job = Arc::new(
                CacheSweepJob::new(Arc::clone(cache))
                    .with_interval(config.cache.sweep_interval)
                    .with_cancellation(shutdown.clone()),
            );
            sweep_job.start().await;
        }
    }

    let dns_addr = config.server.listen_address();
    let dns_task = tokio::spawn(server::start_dns_server(
        dns_addr,
        Arc::clone(&services.use_case),
        shutdown.clone(),
    ));

    tokio::select! {
        _ = server::shutdown_signal() => {
            info!("Shutdown requested");
            shutdown.cancel();
        }
        outcome = dns_task => {
            shutdown.cancel();
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(error = %e, "DNS server error");
                    return Err(e);
                }
                Err(e) => {
                    error!(error = %e, "DNS server task failed");
                    return Err(e.into());
                }
            }
        }
    }

    if let Some(cache) = &services.cache {
        let metrics = cache.metrics_snapshot();
        info!(
            entries = cache.len(),
            hits = metrics.hits,
            misses = metrics.misses,
            insertions = metrics.insertions,
            evictions = metrics.evictions,
            expirations = metrics.expirations,
            hit_rate = %format!("{:.1}%", metrics.hit_rate()),
            "Cache statistics"
        );
    }

    info!("Server shutdown complete");
    Ok(())
}
