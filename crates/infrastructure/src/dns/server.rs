use jsondns_application::ProcessQueryUseCase;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Receive buffer per datagram. Larger than any reply the gateway sends so
/// oversized queries still decode (or fail to) instead of being cut short.
pub const RECV_BUFFER_SIZE: usize = 4096;

/// Datagram listener feeding every query into the gateway pipeline.
pub struct UdpGatewayServer {
    socket: Arc<UdpSocket>,
    use_case: Arc<ProcessQueryUseCase>,
    shutdown: CancellationToken,
}

impl UdpGatewayServer {
    pub async fn bind(bind_addr: &str, use_case: Arc<ProcessQueryUseCase>) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind_addr).await?;
        info!(bind_address = %socket.local_addr()?, "DNS gateway listening (UDP)");

        Ok(Self {
            socket: Arc::new(socket),
            use_case,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serves until the cancellation token fires. Queries still in flight at
    /// that point are left to finish on their own tasks.
    pub async fn run(self) {
        let mut recv_buf = [0u8; RECV_BUFFER_SIZE];

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("DNS gateway: shutting down listener");
                    break;
                }
                received = self.socket.recv_from(&mut recv_buf) => {
                    match received {
                        Ok((len, peer)) => {
                            let datagram = recv_buf[..len].to_vec();
                            let socket = Arc::clone(&self.socket);
                            let use_case = Arc::clone(&self.use_case);

                            tokio::spawn(async move {
                                let reply = use_case.execute(&datagram, peer).await;
                                match socket.send_to(&reply, peer).await {
                                    Ok(sent) => debug!(peer = %peer, bytes = sent, "Reply sent"),
                                    Err(e) => warn!(peer = %peer, error = %e, "Failed to send reply"),
                                }
                            });
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            error!(error = %e, "UDP recv error");
                        }
                    }
                }
            }
        }
    }
}
