use serde::{Deserialize, Serialize};

/// Smallest datagram every DNS implementation must accept (RFC 1035 §4.2.1).
pub const STANDARD_UDP_PAYLOAD: u16 = 512;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Largest reply the gateway will put on the wire, in bytes.
    #[serde(default = "default_max_payload")]
    pub max_payload: u16,
}

impl ServerConfig {
    pub fn listen_address(&self) -> String {
        if self.bind_address.contains(':') && !self.bind_address.starts_with('[') {
            format!("[{}]:{}", self.bind_address, self.dns_port)
        } else {
            format!("{}:{}", self.bind_address, self.dns_port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dns_port: default_dns_port(),
            max_payload: default_max_payload(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_dns_port() -> u16 {
    1053
}

fn default_max_payload() -> u16 {
    STANDARD_UDP_PAYLOAD
}
