use compact_str::CompactString;
use std::fmt;

/// Identity of a cached reply: case-folded name plus type mnemonic.
///
/// Derived from the question only, never from the raw query bytes, so the
/// correlation id and header flags of a request do not split the cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub domain: CompactString,
    pub record_type: CompactString,
}

impl CacheKey {
    #[inline]
    pub fn new(domain: &str, record_type: &str) -> Self {
        let trimmed = domain.trim_end_matches('.');
        Self {
            domain: CompactString::from(trimmed.to_ascii_lowercase()),
            record_type: CompactString::from(record_type.to_ascii_uppercase()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.record_type)
    }
}
