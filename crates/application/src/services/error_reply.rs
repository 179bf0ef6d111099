use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::DNSClass;
use jsondns_domain::{FailureClass, GatewayError};

/// Turns pipeline failures into reply messages.
pub struct ErrorTranslator;

impl ErrorTranslator {
    pub fn response_code(error: &GatewayError) -> ResponseCode {
        match error.failure_class() {
            FailureClass::FormatError => ResponseCode::FormErr,
            FailureClass::ServerFailure => ResponseCode::ServFail,
        }
    }

    /// Reply for `error`. With the request at hand the reply echoes its id,
    /// its `RD` flag and (when it is class IN) its first question.
    pub fn reply_for(request: Option<&Message>, error: &GatewayError) -> Message {
        let rcode = Self::response_code(error);

        let Some(request) = request else {
            let mut reply = Message::new(0, MessageType::Response, OpCode::Query);
            reply.set_response_code(rcode);
            return reply;
        };

        let mut reply = Message::new(request.id(), MessageType::Response, OpCode::Query);
        reply.set_response_code(rcode);
        reply.set_recursion_desired(request.recursion_desired());
        reply.set_recursion_available(true);

        if let Some(question) = request.queries().first() {
            if question.query_class() == DNSClass::IN {
                reply.add_query(question.clone());
            }
        }

        reply
    }

    /// Bare 12-byte header: id, `QR=1`, `RA=1`, the given rcode and zero
    /// counts. Always encodable, used when nothing else is.
    pub fn header_only(id: u16, rcode: ResponseCode) -> Vec<u8> {
        let code = u16::from(rcode) as u8 & 0x0F;
        let mut buf = vec![0u8; 12];
        buf[0] = (id >> 8) as u8;
        buf[1] = id as u8;
        buf[2] = 0x80;
        buf[3] = 0x80 | code;
        buf
    }
}
