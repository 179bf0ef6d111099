mod gateway_client;
mod reply_cache;

pub use gateway_client::GatewayClient;
pub use reply_cache::ReplyCache;

// Re-export for convenience
pub use jsondns_domain::{CacheKey, DnsQuery};
