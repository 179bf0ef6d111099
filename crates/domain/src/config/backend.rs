use serde::{Deserialize, Serialize};

/// Where JSON answers are fetched from: `http://<host>/IN/<name>/<type>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_query_timeout")]
    pub query_timeout: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            query_timeout: default_query_timeout(),
        }
    }
}

fn default_host() -> String {
    "dig.jsondns.org".to_string()
}

fn default_query_timeout() -> u64 {
    5
}
