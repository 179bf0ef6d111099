//! Wire-format encoding and decoding of DNS messages (RFC 1035 §4).

use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use jsondns_domain::GatewayError;

/// Decodes queries and encodes replies, refusing replies that would not fit
/// in a single datagram of `max_payload` bytes.
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    max_payload: usize,
}

impl MessageCodec {
    pub fn new(max_payload: u16) -> Self {
        Self {
            max_payload: max_payload as usize,
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Message, GatewayError> {
        Message::from_vec(bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    pub fn encode(&self, message: &Message) -> Result<Vec<u8>, GatewayError> {
        let mut buf = Vec::with_capacity(self.max_payload.min(4096));
        let mut encoder = BinEncoder::new(&mut buf);

        message
            .emit(&mut encoder)
            .map_err(|e| GatewayError::Encode(e.to_string()))?;

        if buf.len() > self.max_payload {
            return Err(GatewayError::Encode(format!(
                "reply is {} bytes, datagram limit is {}",
                buf.len(),
                self.max_payload
            )));
        }

        Ok(buf)
    }
}
