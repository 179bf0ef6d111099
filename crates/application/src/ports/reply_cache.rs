use hickory_proto::op::Message;
use jsondns_domain::CacheKey;

/// Store of ready-made replies shared by all in-flight queries.
pub trait ReplyCache: Send + Sync {
    /// A copy of the stored reply, or `None` once its TTL has elapsed.
    /// Implementations that track insert time lower record TTLs by the age.
    fn get(&self, key: &CacheKey) -> Option<Message>;

    /// Insert or overwrite; the entry expires `ttl_secs` from now.
    fn set(&self, key: CacheKey, reply: Message, ttl_secs: u32);
}
