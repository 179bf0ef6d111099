use hickory_proto::op::Message;
use jsondns_application::ports::{CacheKey, ReplyCache};

/// Stands in for the cache when caching is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReplyCache;

impl ReplyCache for NoopReplyCache {
    fn get(&self, _key: &CacheKey) -> Option<Message> {
        None
    }

    fn set(&self, _key: CacheKey, _reply: Message, _ttl_secs: u32) {}
}
