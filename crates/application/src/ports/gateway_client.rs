use async_trait::async_trait;
use jsondns_domain::{DnsQuery, GatewayError};

/// HTTP side of the gateway.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Fetch the JSON answer document for one question.
    ///
    /// Transport problems and non-success statuses are `GatewayError::Fetch`,
    /// a body that is not JSON is `GatewayError::Parse`.
    async fn fetch(&self, query: &DnsQuery) -> Result<serde_json::Value, GatewayError>;
}
