use jsondns_application::ports::{GatewayClient, ReplyCache};
use jsondns_application::ProcessQueryUseCase;
use jsondns_domain::Config;
use jsondns_infrastructure::dns::{NoopReplyCache, TtlCache};
use jsondns_infrastructure::gateway::HttpGatewayClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct GatewayServices {
    /// `None` when caching is disabled.
    pub cache: Option<Arc<TtlCache>>,
    pub use_case: Arc<ProcessQueryUseCase>,
}

impl GatewayServices {
    pub fn new(config: &Config) -> Self {
        info!(
            backend = %config.backend.host,
            timeout_secs = config.backend.query_timeout,
            cache_enabled = config.cache.enabled,
            "Initializing gateway services"
        );

        let client: Arc<dyn GatewayClient> = Arc::new(HttpGatewayClient::new(
            config.backend.host.clone(),
            Duration::from_secs(config.backend.query_timeout),
        ));

        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(TtlCache::new(config.cache.max_entries)));

        let reply_cache: Arc<dyn ReplyCache> = match &cache {
            Some(cache) => Arc::clone(cache) as Arc<dyn ReplyCache>,
            None => Arc::new(NoopReplyCache),
        };

        let mut use_case = ProcessQueryUseCase::new(client, reply_cache)
            .with_max_payload(config.server.max_payload)
            .with_default_ttl(config.cache.default_ttl);
        if config.cache.enabled && config.cache.coalesce_inflight {
            use_case = use_case.with_inflight_coalescing();
        }

        Self {
            cache,
            use_case: Arc::new(use_case),
        }
    }
}
