#![allow(dead_code)]

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use jsondns_application::ports::{GatewayClient, ReplyCache};
use jsondns_application::services::MessageCodec;
use jsondns_domain::{CacheKey, DnsQuery, GatewayError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

// ── MockGatewayClient ──────────────────────────────────────────────────────

pub struct MockGatewayClient {
    responses: RwLock<HashMap<String, Result<Value, GatewayError>>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockGatewayClient {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_response(&self, domain: &str, body: Value) {
        self.responses
            .write()
            .unwrap()
            .insert(domain.to_ascii_lowercase(), Ok(body));
    }

    pub fn set_error(&self, domain: &str, error: GatewayError) {
        self.responses
            .write()
            .unwrap()
            .insert(domain.to_ascii_lowercase(), Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Domains exactly as the pipeline handed them to the client.
    pub fn requested_domains(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayClient for MockGatewayClient {
    async fn fetch(&self, query: &DnsQuery) -> Result<Value, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap()
            .push(query.domain.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let url = format!("http://mock/IN/{}/{}", query.domain, query.record_type);
        self.responses
            .read()
            .unwrap()
            .get(&query.domain.to_ascii_lowercase())
            .cloned()
            .unwrap_or(Err(GatewayError::Fetch {
                url,
                reason: "connection refused".to_string(),
            }))
    }
}

// ── InMemoryReplyCache ─────────────────────────────────────────────────────

/// Never expires; remembers the TTL each entry was stored with.
pub struct InMemoryReplyCache {
    entries: Mutex<HashMap<CacheKey, (Message, u32)>>,
}

impl InMemoryReplyCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn ttl_for(&self, domain: &str, record_type: &str) -> Option<u32> {
        self.entries
            .lock()
            .unwrap()
            .get(&CacheKey::new(domain, record_type))
            .map(|(_, ttl)| *ttl)
    }
}

impl ReplyCache for InMemoryReplyCache {
    fn get(&self, key: &CacheKey) -> Option<Message> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(message, _)| message.clone())
    }

    fn set(&self, key: CacheKey, reply: Message, ttl_secs: u32) {
        self.entries.lock().unwrap().insert(key, (reply, ttl_secs));
    }
}

// ── Wire helpers ───────────────────────────────────────────────────────────

/// Keeps the spelling of `name`; `Name::from_str` would fold it to lowercase.
pub fn query_message(id: u16, name: &str, record_type: RecordType) -> Message {
    query_for(id, Name::from_ascii(name).unwrap(), record_type)
}

pub fn query_for(id: u16, name: Name, record_type: RecordType) -> Message {
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(name, record_type));
    message
}

pub fn query_bytes(id: u16, name: &str, record_type: RecordType) -> Vec<u8> {
    encode(&query_message(id, name, record_type))
}

pub fn encode(message: &Message) -> Vec<u8> {
    MessageCodec::new(u16::MAX).encode(message).unwrap()
}

pub fn decode(bytes: &[u8]) -> Message {
    MessageCodec::new(u16::MAX).decode(bytes).unwrap()
}
