//! Typed shape of the JSON answers served by the backend.
//!
//! ```json
//! {
//!   "header":   { "aa": true, "rcode": "NOERROR" },
//!   "question": [ { "qname": "example.com", "qtype": "A" } ],
//!   "answer":   [ { "name": "example.com", "type": "A", "ttl": 300, "rdata": "93.184.216.34" } ]
//! }
//! ```
//!
//! Only `answer` is required. Unknown keys (including header `rd`/`ra`, which
//! the gateway sets itself) are ignored, but a known key with the wrong JSON
//! type makes the whole document unusable.

use super::GatewayError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AnswerDocument {
    #[serde(default)]
    pub header: Option<DocumentHeader>,

    #[serde(default)]
    pub question: Vec<DocumentQuestion>,

    pub answer: Vec<DocumentRecord>,

    #[serde(default)]
    pub authority: Vec<DocumentRecord>,

    #[serde(default)]
    pub additional: Vec<DocumentRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DocumentHeader {
    #[serde(default)]
    pub aa: Option<bool>,
    #[serde(default)]
    pub tc: Option<bool>,
    #[serde(default)]
    pub rcode: Option<ResponseCodeField>,
}

/// `"NXDOMAIN"` and `3` are both accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ResponseCodeField {
    Code(u16),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DocumentQuestion {
    pub qname: String,
    pub qtype: String,
    #[serde(default)]
    pub qclass: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DocumentRecord {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "type")]
    pub record_type: Option<String>,

    #[serde(default)]
    pub class: Option<String>,

    #[serde(default)]
    pub ttl: Option<u32>,

    #[serde(default)]
    pub rdata: Option<String>,

    #[serde(default)]
    pub address: Option<String>,
}

impl AnswerDocument {
    /// Checks a parsed JSON value against the schema.
    pub fn from_json(value: serde_json::Value) -> Result<Self, GatewayError> {
        serde_json::from_value(value).map_err(|e| GatewayError::Conversion(e.to_string()))
    }

    /// True when the backend stated the authoritative-answer flag itself.
    pub fn sets_authoritative(&self) -> bool {
        self.header.as_ref().is_some_and(|h| h.aa.is_some())
    }
}

impl DocumentRecord {
    /// Record data in presentation format; `address` is an alias of `rdata`.
    pub fn rdata_text(&self) -> Option<&str> {
        self.rdata.as_deref().or(self.address.as_deref())
    }
}
