pub mod cache;
pub mod server;

pub use cache::{CacheMetricsSnapshot, ManualClock, NoopReplyCache, TtlCache};
pub use server::UdpGatewayServer;
