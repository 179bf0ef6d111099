use crate::ports::{GatewayClient, ReplyCache};
use crate::services::{
    type_mnemonic, AnswerMapper, ErrorTranslator, MessageCodec, MessageValidator,
};
use dashmap::DashMap;
use hickory_proto::op::{Message, MessageType, Query};
use jsondns_domain::config::server::STANDARD_UDP_PAYLOAD;
use jsondns_domain::{AnswerDocument, CacheKey, DnsQuery, GatewayError, DEFAULT_ANSWER_TTL};
use rustc_hash::FxBuildHasher;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, warn};

type InflightSender = Arc<watch::Sender<bool>>;
type InflightMap = DashMap<CacheKey, InflightSender, FxBuildHasher>;

struct InflightLeaderGuard {
    inflight: Arc<InflightMap>,
    key: CacheKey,
}

impl Drop for InflightLeaderGuard {
    fn drop(&mut self) {
        if let Some((_, tx)) = self.inflight.remove(&self.key) {
            let _ = tx.send(true);
        }
    }
}

/// Runs one datagram through the gateway: decode, validate, answer from the
/// cache or the upstream, encode. Every outcome is a reply datagram.
pub struct ProcessQueryUseCase {
    client: Arc<dyn GatewayClient>,
    cache: Arc<dyn ReplyCache>,
    codec: MessageCodec,
    mapper: AnswerMapper,
    inflight: Option<Arc<InflightMap>>,
}

impl ProcessQueryUseCase {
    pub fn new(client: Arc<dyn GatewayClient>, cache: Arc<dyn ReplyCache>) -> Self {
        Self {
            client,
            cache,
            codec: MessageCodec::new(STANDARD_UDP_PAYLOAD),
            mapper: AnswerMapper::new(DEFAULT_ANSWER_TTL),
            inflight: None,
        }
    }

    pub fn with_max_payload(mut self, max_payload: u16) -> Self {
        self.codec = MessageCodec::new(max_payload);
        self
    }

    pub fn with_default_ttl(mut self, default_ttl: u32) -> Self {
        self.mapper = AnswerMapper::new(default_ttl);
        self
    }

    /// Concurrent misses for one key share a single upstream fetch.
    pub fn with_inflight_coalescing(mut self) -> Self {
        self.inflight = Some(Arc::new(DashMap::with_hasher(FxBuildHasher)));
        self
    }

    pub async fn execute(&self, raw: &[u8], peer: SocketAddr) -> Vec<u8> {
        let request = match self.codec.decode(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(peer = %peer, bytes = raw.len(), error = %e, "Undecodable query");
                return self.failure_reply(None, &e);
            }
        };

        if let Err(e) = Self::check_inbound(&request) {
            warn!(peer = %peer, id = request.id(), error = %e, "Rejected malformed query");
            return self.failure_reply(Some(&request), &e);
        }

        match self.answer(&request, peer).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log_failure(peer, &e);
                self.failure_reply(Some(&request), &e)
            }
        }
    }

    fn check_inbound(request: &Message) -> Result<(), GatewayError> {
        if request.message_type() != MessageType::Query {
            return Err(GatewayError::InboundValidation(
                "message is a reply, not a query".to_string(),
            ));
        }
        MessageValidator::validate(request).map_err(GatewayError::InboundValidation)
    }

    async fn answer(&self, request: &Message, peer: SocketAddr) -> Result<Vec<u8>, GatewayError> {
        // Only the first question is answered; any others are ignored.
        let question = request
            .queries()
            .first()
            .cloned()
            .ok_or_else(|| GatewayError::InboundValidation("no question".to_string()))?;

        // Presentation form with escapes and `xn--` labels, never decoded UTF-8.
        let query = DnsQuery::new(
            &question.name().to_ascii(),
            &type_mnemonic(question.query_type()),
        );
        debug!(
            "{} requested {} record for {}",
            peer, query.record_type, query.domain
        );

        let key = query.cache_key();

        let reply = match self.cache.get(&key) {
            Some(cached) => {
                debug!(key = %key, "Cache HIT");
                let reply = restamp(echo_question(cached, &question), request);
                MessageValidator::validate(&reply).map_err(GatewayError::OutboundValidation)?;
                reply
            }
            None => {
                debug!(key = %key, "Cache MISS");
                match &self.inflight {
                    Some(inflight) => {
                        self.resolve_coalesced(inflight, key, &query, &question, request)
                            .await?
                    }
                    None => self.resolve(key, &query, &question, request).await?,
                }
            }
        };

        self.codec.encode(&reply)
    }

    async fn resolve_coalesced(
        &self,
        inflight: &Arc<InflightMap>,
        key: CacheKey,
        query: &DnsQuery,
        question: &Query,
        request: &Message,
    ) -> Result<Message, GatewayError> {
        let follower = match inflight.entry(key.clone()) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                Some(rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, _) = watch::channel(false);
                e.insert(Arc::new(tx));
                None
            }
        };

        match follower {
            Some(mut rx) => {
                let _ = rx.changed().await;
                if let Some(cached) = self.cache.get(&key) {
                    debug!(key = %key, "Served by in-flight fetch");
                    let reply = restamp(echo_question(cached, question), request);
                    MessageValidator::validate(&reply)
                        .map_err(GatewayError::OutboundValidation)?;
                    return Ok(reply);
                }
                self.resolve(key, query, question, request).await
            }
            None => {
                let _guard = InflightLeaderGuard {
                    inflight: Arc::clone(inflight),
                    key: key.clone(),
                };
                self.resolve(key, query, question, request).await
            }
        }
    }

    async fn resolve(
        &self,
        key: CacheKey,
        query: &DnsQuery,
        question: &Query,
        request: &Message,
    ) -> Result<Message, GatewayError> {
        let json = self.client.fetch(query).await?;
        let document = AnswerDocument::from_json(json)?;

        let mut reply = self.mapper.to_message(&document, question)?;
        if !document.sets_authoritative() {
            reply.set_authoritative(true);
        }

        let reply = restamp(reply, request);
        MessageValidator::validate(&reply).map_err(GatewayError::OutboundValidation)?;

        let ttl = reply
            .answers()
            .first()
            .map(|record| record.ttl())
            .unwrap_or(self.mapper.default_ttl());

        debug!(key = %key, ttl, answers = reply.answers().len(), "Caching reply");
        self.cache.set(key, reply.clone(), ttl);

        Ok(reply)
    }

    fn failure_reply(&self, request: Option<&Message>, error: &GatewayError) -> Vec<u8> {
        let reply = ErrorTranslator::reply_for(request, error);

        if MessageValidator::is_valid(&reply) {
            if let Ok(bytes) = self.codec.encode(&reply) {
                return bytes;
            }
        }

        ErrorTranslator::header_only(reply.id(), reply.response_code())
    }
}

fn restamp(mut reply: Message, request: &Message) -> Message {
    let mut header = *reply.header();
    header
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true);
    reply.set_header(header);
    reply
}

/// A cached reply carries the spelling of whoever asked first; give this
/// requester back their own question when it is the same one.
fn echo_question(mut reply: Message, question: &Query) -> Message {
    let same = reply.queries().first().is_some_and(|cached| {
        cached.name() == question.name() && cached.query_type() == question.query_type()
    });
    if same {
        *reply.queries_mut() = vec![question.clone()];
    }
    reply
}

fn log_failure(peer: SocketAddr, error: &GatewayError) {
    match error {
        GatewayError::Fetch { url, reason } | GatewayError::Parse { url, reason } => {
            error!(peer = %peer, kind = error.kind(), url = %url, error = %reason, "Upstream request failed");
        }
        GatewayError::Conversion(reason) => {
            error!(peer = %peer, kind = error.kind(), error = %reason, "Upstream answer not convertible");
        }
        _ => {
            error!(peer = %peer, kind = error.kind(), error = %error, "Query failed");
        }
    }
}
