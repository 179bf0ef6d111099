use jsondns_application::ProcessQueryUseCase;
use jsondns_infrastructure::dns::UdpGatewayServer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub async fn start_dns_server(
    bind_addr: String,
    use_case: Arc<ProcessQueryUseCase>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let server = match UdpGatewayServer::bind(&bind_addr, use_case).await {
        Ok(server) => server.with_cancellation(shutdown),
        Err(e) => {
            error!(
                bind_address = %bind_addr,
                error = %e,
                "Cannot bind DNS socket (ports below 1024 need elevated privileges)"
            );
            return Err(e.into());
        }
    };

    info!("DNS gateway ready on {}", server.local_addr()?);
    server.run().await;
    Ok(())
}
