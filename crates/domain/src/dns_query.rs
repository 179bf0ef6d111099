use super::CacheKey;
use compact_str::CompactString;
use std::sync::Arc;

/// The single question a gateway run answers.
///
/// `domain` keeps the requester's spelling without the trailing root dot,
/// `record_type` is the type mnemonic (`A`, `MX`, `TYPE65280`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: CompactString,
}

impl DnsQuery {
    pub fn new(domain: &str, record_type: &str) -> Self {
        let trimmed = domain.trim_end_matches('.');
        let domain = if trimmed.is_empty() { "." } else { trimmed };
        Self {
            domain: Arc::from(domain),
            record_type: CompactString::from(record_type),
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.domain, &self.record_type)
    }
}
