pub mod clock;
pub mod metrics;
pub mod noop;
pub mod ttl_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use noop::NoopReplyCache;
pub use ttl_cache::TtlCache;
