use serde::{Deserialize, Serialize};

/// TTL applied when an upstream answer does not carry one.
pub const DEFAULT_ANSWER_TTL: u32 = 10;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// 0 means unbounded; expiry is then the only way entries leave.
    #[serde(default)]
    pub max_entries: usize,

    #[serde(default = "default_true")]
    pub coalesce_inflight: bool,

    /// Seconds between sweeps of expired entries, 0 disables the sweeper.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: default_ttl(),
            max_entries: 0,
            coalesce_inflight: true,
            sweep_interval: default_sweep_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl() -> u32 {
    DEFAULT_ANSWER_TTL
}

fn default_sweep_interval() -> u64 {
    60
}
