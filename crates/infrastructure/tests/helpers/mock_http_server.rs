#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[derive(Clone)]
pub enum MockReply {
    Respond { status: u16, body: String },
    /// Accept the connection, never answer.
    Hang,
}

impl MockReply {
    pub fn json(body: &str) -> Self {
        Self::Respond {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::Respond {
            status,
            body: String::new(),
        }
    }
}

/// Tiny HTTP/1.1 server answering every request with one canned reply.
pub struct MockHttpServer {
    addr: SocketAddr,
    paths: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockHttpServer {
    pub async fn start(reply: MockReply) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let paths = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let seen = Arc::clone(&paths);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        if let Ok((stream, _)) = accepted {
                            let reply = reply.clone();
                            let seen = Arc::clone(&seen);
                            tokio::spawn(async move {
                                let _ = Self::serve(stream, reply, seen).await;
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            paths,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// `host:port`, as the gateway client expects it.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.paths.lock().unwrap().len()
    }

    async fn serve(
        mut stream: TcpStream,
        reply: MockReply,
        seen: Arc<Mutex<Vec<String>>>,
    ) -> std::io::Result<()> {
        let mut request = Vec::with_capacity(1024);
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            request.extend_from_slice(&chunk[..n]);
        }

        let text = String::from_utf8_lossy(&request);
        if let Some(path) = text.lines().next().and_then(|l| l.split_whitespace().nth(1)) {
            seen.lock().unwrap().push(path.to_string());
        }

        match reply {
            MockReply::Respond { status, body } => {
                let head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    reason(status),
                    body.len()
                );
                stream.write_all(head.as_bytes()).await?;
                stream.write_all(body.as_bytes()).await?;
                stream.shutdown().await
            }
            MockReply::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                Ok(())
            }
        }
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
