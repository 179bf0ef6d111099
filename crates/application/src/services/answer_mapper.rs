use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, PTR, SOA, SRV, TXT};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use jsondns_domain::{
    AnswerDocument, DocumentQuestion, DocumentRecord, GatewayError, ResponseCodeField,
};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Mnemonic used in upstream URLs and cache keys; unnamed types render as
/// `TYPEnnn` (RFC 3597).
pub fn type_mnemonic(record_type: RecordType) -> String {
    match record_type {
        RecordType::Unknown(code) => format!("TYPE{}", code),
        other => other.to_string(),
    }
}

/// Parses a type mnemonic, accepting the `TYPEnnn` form as well.
pub fn parse_record_type(text: &str) -> Option<RecordType> {
    let upper = text.trim().to_ascii_uppercase();
    if let Some(code) = upper.strip_prefix("TYPE") {
        if let Ok(code) = code.parse::<u16>() {
            return Some(RecordType::from(code));
        }
    }
    RecordType::from_str(&upper).ok()
}

/// Builds reply messages out of upstream JSON answers.
#[derive(Debug, Clone, Copy)]
pub struct AnswerMapper {
    default_ttl: u32,
}

impl AnswerMapper {
    pub fn new(default_ttl: u32) -> Self {
        Self { default_ttl }
    }

    pub fn default_ttl(&self) -> u32 {
        self.default_ttl
    }

    /// Converts `document` into a reply for `request_question`.
    ///
    /// The returned message has id 0 and `AA` only when the document says
    /// so; restamping and the authoritative default are left to the caller.
    pub fn to_message(
        &self,
        document: &AnswerDocument,
        request_question: &Query,
    ) -> Result<Message, GatewayError> {
        let question = match document.question.first() {
            Some(q) => parse_question(q)?,
            None => request_question.clone(),
        };

        let mut message = Message::new(0, MessageType::Response, OpCode::Query);

        if let Some(header) = &document.header {
            message.set_authoritative(header.aa.unwrap_or(false));
            message.set_truncated(header.tc.unwrap_or(false));
            if let Some(rcode) = &header.rcode {
                message.set_response_code(parse_response_code(rcode)?);
            }
        }

        for entry in &document.answer {
            message.add_answer(self.to_record(entry, &question)?);
        }
        for entry in &document.authority {
            message.add_name_server(self.to_record(entry, &question)?);
        }
        for entry in &document.additional {
            message.add_additional(self.to_record(entry, &question)?);
        }

        message.add_query(question);
        Ok(message)
    }

    fn to_record(&self, entry: &DocumentRecord, question: &Query) -> Result<Record, GatewayError> {
        let owner = match entry.name.as_deref() {
            Some(name) => parse_name(name)?,
            None => question.name().clone(),
        };

        let record_type = match entry.record_type.as_deref() {
            Some(text) => parse_record_type(text)
                .ok_or_else(|| GatewayError::Conversion(format!("unknown record type '{}'", text)))?,
            None => question.query_type(),
        };

        if let Some(class) = entry.class.as_deref() {
            check_class(class)?;
        }

        let text = entry.rdata_text().ok_or_else(|| {
            GatewayError::Conversion(format!("{} record for {} has no rdata", record_type, owner))
        })?;

        let rdata = parse_rdata(record_type, text)?;
        let ttl = entry.ttl.unwrap_or(self.default_ttl);

        Ok(Record::from_rdata(owner, ttl, rdata))
    }
}

fn parse_question(question: &DocumentQuestion) -> Result<Query, GatewayError> {
    let name = parse_name(&question.qname)?;
    let record_type = parse_record_type(&question.qtype).ok_or_else(|| {
        GatewayError::Conversion(format!("unknown question type '{}'", question.qtype))
    })?;
    if let Some(class) = question.qclass.as_deref() {
        check_class(class)?;
    }
    Ok(Query::query(name, record_type))
}

fn check_class(class: &str) -> Result<(), GatewayError> {
    if class.trim().eq_ignore_ascii_case("IN") {
        Ok(())
    } else {
        Err(GatewayError::Conversion(format!("unsupported class '{}'", class)))
    }
}

fn parse_name(text: &str) -> Result<Name, GatewayError> {
    let text = text.trim();
    let fqdn = if text.ends_with('.') {
        text.to_string()
    } else {
        format!("{}.", text)
    };
    Name::from_str(&fqdn).map_err(|e| GatewayError::Conversion(format!("bad name '{}': {}", text, e)))
}

const MAX_HEADER_RCODE: u16 = 0x000F;

fn parse_response_code(field: &ResponseCodeField) -> Result<ResponseCode, GatewayError> {
    let code = match field {
        ResponseCodeField::Code(code) => *code,
        ResponseCodeField::Name(name) => match name.trim().to_ascii_uppercase().as_str() {
            "NOERROR" => 0,
            "FORMERR" => 1,
            "SERVFAIL" => 2,
            "NXDOMAIN" => 3,
            "NOTIMP" => 4,
            "REFUSED" => 5,
            "YXDOMAIN" => 6,
            "YXRRSET" => 7,
            "NXRRSET" => 8,
            "NOTAUTH" => 9,
            "NOTZONE" => 10,
            _ => {
                return Err(GatewayError::Conversion(format!(
                    "unknown response code '{}'",
                    name
                )))
            }
        },
    };
    // Replies carry no OPT record, so only the 4-bit header field exists.
    if code > MAX_HEADER_RCODE {
        return Err(GatewayError::Conversion(format!(
            "response code {} needs EDNS",
            code
        )));
    }
    Ok(code.into())
}

fn parse_field<T: FromStr>(
    record_type: RecordType,
    fields: &[&str],
    index: usize,
) -> Result<T, GatewayError> {
    fields
        .get(index)
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| {
            GatewayError::Conversion(format!(
                "malformed {} rdata '{}'",
                record_type,
                fields.join(" ")
            ))
        })
}

fn parse_name_field(
    record_type: RecordType,
    fields: &[&str],
    index: usize,
) -> Result<Name, GatewayError> {
    let text: String = parse_field(record_type, fields, index)?;
    parse_name(&text)
}

fn parse_rdata(record_type: RecordType, text: &str) -> Result<RData, GatewayError> {
    let text = text.trim();
    let bad = |reason: String| {
        GatewayError::Conversion(format!(
            "malformed {} rdata '{}': {}",
            record_type, text, reason
        ))
    };

    let rdata = match record_type {
        RecordType::A => {
            let addr: Ipv4Addr = text.parse().map_err(|e: std::net::AddrParseError| bad(e.to_string()))?;
            RData::A(A(addr))
        }
        RecordType::AAAA => {
            let addr: Ipv6Addr = text.parse().map_err(|e: std::net::AddrParseError| bad(e.to_string()))?;
            RData::AAAA(AAAA(addr))
        }
        RecordType::CNAME => RData::CNAME(CNAME(parse_name(text)?)),
        RecordType::NS => RData::NS(NS(parse_name(text)?)),
        RecordType::PTR => RData::PTR(PTR(parse_name(text)?)),
        RecordType::TXT => RData::TXT(TXT::new(vec![text.to_string()])),
        RecordType::MX | RecordType::SOA | RecordType::SRV => {
            let fields: Vec<&str> = text.split_whitespace().collect();
            let expected = match record_type {
                RecordType::MX => 2,
                RecordType::SOA => 7,
                _ => 4,
            };
            if fields.len() != expected {
                return Err(bad(format!("expected {} fields, got {}", expected, fields.len())));
            }
            match record_type {
                RecordType::MX => RData::MX(MX::new(
                    parse_field(record_type, &fields, 0)?,
                    parse_name_field(record_type, &fields, 1)?,
                )),
                RecordType::SOA => RData::SOA(SOA::new(
                    parse_name_field(record_type, &fields, 0)?,
                    parse_name_field(record_type, &fields, 1)?,
                    parse_field(record_type, &fields, 2)?,
                    parse_field(record_type, &fields, 3)?,
                    parse_field(record_type, &fields, 4)?,
                    parse_field(record_type, &fields, 5)?,
                    parse_field(record_type, &fields, 6)?,
                )),
                _ => RData::SRV(SRV::new(
                    parse_field(record_type, &fields, 0)?,
                    parse_field(record_type, &fields, 1)?,
                    parse_field(record_type, &fields, 2)?,
                    parse_name_field(record_type, &fields, 3)?,
                )),
            }
        }
        other => {
            return Err(GatewayError::Conversion(format!(
                "unsupported record type {}",
                type_mnemonic(other)
            )))
        }
    };

    Ok(rdata)
}
