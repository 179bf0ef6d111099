use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::{DNSClass, Record, RecordType};

/// Largest TTL a record may carry (RFC 2181 §8).
pub const MAX_RECORD_TTL: u32 = i32::MAX as u32;

/// Structural checks a message must pass before the gateway acts on it or
/// puts it on the wire.
pub struct MessageValidator;

impl MessageValidator {
    pub fn is_valid(message: &Message) -> bool {
        Self::validate(message).is_ok()
    }

    /// Returns the first violated rule.
    pub fn validate(message: &Message) -> Result<(), String> {
        if message.op_code() != OpCode::Query {
            return Err(format!("unsupported opcode {:?}", message.op_code()));
        }

        Self::check_section_sizes(message)?;

        match message.message_type() {
            MessageType::Query => Self::check_query(message)?,
            MessageType::Response => Self::check_reply(message)?,
        }

        for query in message.queries() {
            if query.query_class() != DNSClass::IN {
                return Err(format!(
                    "question {} has unsupported class {:?}",
                    query.name(),
                    query.query_class()
                ));
            }
        }

        let records = message
            .answers()
            .iter()
            .chain(message.name_servers())
            .chain(message.additionals());
        for record in records {
            Self::check_record(record)?;
        }

        Ok(())
    }

    fn check_section_sizes(message: &Message) -> Result<(), String> {
        let limit = u16::MAX as usize;
        if message.queries().len() > limit
            || message.answers().len() > limit
            || message.name_servers().len() > limit
            || message.additionals().len() > limit
        {
            return Err("section exceeds 65535 entries".to_string());
        }
        Ok(())
    }

    fn check_query(message: &Message) -> Result<(), String> {
        if message.queries().is_empty() {
            return Err("query carries no question".to_string());
        }
        if message.response_code() != ResponseCode::NoError {
            return Err(format!(
                "query carries response code {:?}",
                message.response_code()
            ));
        }
        if !message.answers().is_empty() {
            return Err("query carries answer records".to_string());
        }
        Ok(())
    }

    fn check_reply(message: &Message) -> Result<(), String> {
        if message.queries().len() > 1 {
            return Err(format!(
                "reply carries {} questions",
                message.queries().len()
            ));
        }

        let rcode = message.response_code();
        let is_error = matches!(
            rcode,
            ResponseCode::FormErr
                | ResponseCode::ServFail
                | ResponseCode::NotImp
                | ResponseCode::Refused
        );

        if is_error {
            if message.authoritative() {
                return Err(format!("authoritative reply with response code {:?}", rcode));
            }
            if !message.answers().is_empty() {
                return Err(format!("answer records in a {:?} reply", rcode));
            }
        }

        if rcode == ResponseCode::NXDomain
            && message
                .answers()
                .iter()
                .any(|r| r.record_type() != RecordType::CNAME)
        {
            return Err("NXDOMAIN reply carries non-CNAME answers".to_string());
        }

        Ok(())
    }

    fn check_record(record: &Record) -> Result<(), String> {
        if record.record_type() != RecordType::OPT && record.dns_class() != DNSClass::IN {
            return Err(format!(
                "record {} has unsupported class {:?}",
                record.name(),
                record.dns_class()
            ));
        }
        if record.ttl() > MAX_RECORD_TTL {
            return Err(format!("record {} has TTL {} out of range", record.name(), record.ttl()));
        }
        Ok(())
    }
}
