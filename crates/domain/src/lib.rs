//! jsondns Domain Layer
pub mod answer_document;
pub mod cache_key;
pub mod config;
pub mod dns_query;
pub mod errors;

pub use answer_document::{
    AnswerDocument, DocumentHeader, DocumentQuestion, DocumentRecord, ResponseCodeField,
};
pub use cache_key::CacheKey;
pub use config::{CliOverrides, Config, ConfigError};
pub use config::cache::DEFAULT_ANSWER_TTL;
pub use dns_query::DnsQuery;
pub use errors::{FailureClass, GatewayError};
